#![no_main]

use arxiv_digest::text::{find_citations, normalize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let once = normalize(text);
    let _ = normalize(&once);

    // spans must always slice the input on char boundaries
    for citation in find_citations(text) {
        assert_eq!(&text[citation.span.clone()], citation.matched);
    }
});
