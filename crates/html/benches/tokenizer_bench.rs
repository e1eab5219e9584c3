use criterion::{Criterion, black_box, criterion_group, criterion_main};
use html::{HtmlTokenizer, ScanBuffer, ScanResult, TokenizerConfig};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

fn make_blocks(count: usize) -> String {
    let mut out = String::with_capacity(count * 64);
    for idx in 0..count {
        out.push_str("<div class=box id=b");
        out.push_str(&idx.to_string());
        out.push_str("><span>hello &amp; bye</span><img src=x></div>");
    }
    out
}

fn make_rawtext_adversarial(chars: usize) -> String {
    let mut body = String::with_capacity(chars + 32);
    body.push_str("<script>");
    while body.len() < chars {
        body.push_str("</scri<pt");
    }
    body.push_str("</script>");
    body
}

fn count_pieces(input: &str, window: usize) -> usize {
    let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).expect("default config");
    let mut buffer = ScanBuffer::new(window);
    let mut rest = input;
    let mut pieces = 0usize;
    loop {
        match tokenizer.next_token(&mut buffer).expect("scan") {
            ScanResult::Token => pieces += 1,
            ScanResult::NeedMoreInput if rest.is_empty() => buffer.set_end_of_stream(),
            ScanResult::NeedMoreInput => {
                let taken = buffer.fill(rest);
                rest = &rest[taken..];
            }
            ScanResult::Finished => return pieces,
        }
    }
}

fn bench_tokenize_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_tokenize_small", |b| {
        b.iter(|| black_box(count_pieces(black_box(&input), 4096)));
    });
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_large", |b| {
        b.iter(|| black_box(count_pieces(black_box(&input), 4096)));
    });
}

fn bench_tokenize_small_window(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_small_window", |b| {
        b.iter(|| black_box(count_pieces(black_box(&input), 64)));
    });
}

fn bench_rawtext_adversarial(c: &mut Criterion) {
    let input = make_rawtext_adversarial(256 * 1024);
    c.bench_function("bench_rawtext_adversarial", |b| {
        b.iter(|| black_box(count_pieces(black_box(&input), 4096)));
    });
}

criterion_group!(
    benches,
    bench_tokenize_small,
    bench_tokenize_large,
    bench_tokenize_small_window,
    bench_rawtext_adversarial
);
criterion_main!(benches);
