//! Text processing over LLM output: normalization, citation extraction,
//! hyperlinking and ranked-title extraction.

pub mod citations;
pub mod links;
pub mod normalize;
pub mod titles;

pub use citations::find_citations;
pub use links::{anchor, annotate, link_citations, link_titles};
pub use normalize::{contains_phrase, normalize};
pub use titles::{extract_ranked_titles, select_papers_by_titles};
