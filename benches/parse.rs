use criterion::{criterion_group, criterion_main, Criterion};

use pxml::{parse, Parser, XmlEvent};

static SHORT_DOC: &'static str =
	"<?xml version='1.0'?><message to='juliet@example.com' type='chat'>\
	 <body>Wherefore art thou?</body></message>";

fn build_catalog(entries: usize) -> String {
	let mut doc = String::with_capacity(entries * 160);
	doc.push_str("<?xml version=\"1.0\"?><catalog xmlns=\"urn:catalog\">");
	for i in 0..entries {
		doc.push_str(&format!(
			"<item sku=\"{}\" price=\"{}.99\"><name>Item no. {}</name>\
			 <desc><![CDATA[useful &amp; cheap]]></desc></item>",
			i,
			i % 100,
			i
		));
	}
	doc.push_str("</catalog>");
	doc
}

fn short_document(c: &mut Criterion) {
	let mut group = c.benchmark_group("short_document");

	group.bench_function("events", |b| {
		let mut evs: Vec<XmlEvent> = Vec::with_capacity(16);

		b.iter(|| {
			evs.clear();
			let mut p = Parser::from_str(SHORT_DOC);
			p.read_all(|ev| {
				evs.push(ev);
			})
			.unwrap();
		});
	});

	group.bench_function("tree", |b| {
		b.iter(|| {
			parse(SHORT_DOC).unwrap();
		});
	});
}

fn huge_document(c: &mut Criterion) {
	let doc = build_catalog(1000);
	let mut group = c.benchmark_group("huge_document");

	group.bench_function("events", |b| {
		let mut count = 0usize;

		b.iter(|| {
			count = 0;
			let mut p = Parser::from_str(doc.clone());
			p.read_all(|_| {
				count += 1;
			})
			.unwrap();
			assert!(count > 0);
		});
	});

	group.bench_function("tree", |b| {
		b.iter(|| {
			let root = parse(doc.clone()).unwrap();
			assert_eq!(root.children.len(), 1000);
		});
	});
}

criterion_group! {
	name = benches;
	config = Criterion::default().sample_size(100);
	targets = short_document, huge_document
}
criterion_main!(benches);
