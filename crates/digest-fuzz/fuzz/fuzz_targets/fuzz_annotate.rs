#![no_main]

use arxiv_digest::PaperRecord;
use arxiv_digest::text::annotate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // titles drawn from the input itself so matches actually happen
    let papers: Vec<PaperRecord> = text
        .lines()
        .take(4)
        .enumerate()
        .filter_map(|(i, line)| {
            let url = format!("http://arxiv.org/abs/2401.{i:05}");
            PaperRecord::new(line, vec!["Ann Smith".to_string()], "", url).ok()
        })
        .collect();

    let _ = annotate(text, &papers);
});
