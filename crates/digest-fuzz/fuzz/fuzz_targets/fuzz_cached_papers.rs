#![no_main]

use arxiv_digest::PaperRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // A corrupt cache file must fail to decode, never panic
    if let Ok(papers) = serde_json::from_slice::<Vec<PaperRecord>>(data) {
        for paper in &papers {
            assert!(!paper.title().trim().is_empty());
            let _ = paper.publication_year();
        }
    }
});
