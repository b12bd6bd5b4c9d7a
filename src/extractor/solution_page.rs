use scraper::{Html, Selector};
use std::sync::OnceLock;

pub struct SolutionPageExtractor;

impl SolutionPageExtractor {
    /// Leaderboard identifier carried by the correct-submissions block, if any.
    pub fn extract_leaderboard_id(html: &str) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("p.correct-submissions").unwrap());

        Html::parse_document(html)
            .select(selector)
            .next()
            .and_then(|el| el.value().attr("data-directory"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mocks::solution_page;

    #[test]
    fn test_extracts_data_directory() {
        let html = solution_page(Some("robot-tug-of-war"));
        assert_eq!(
            SolutionPageExtractor::extract_leaderboard_id(&html).as_deref(),
            Some("robot-tug-of-war")
        );
    }

    #[test]
    fn test_missing_block_or_attribute() {
        assert_eq!(SolutionPageExtractor::extract_leaderboard_id(&solution_page(None)), None);
        let html = r#"<html><body><p class="correct-submissions">Solvers</p></body></html>"#;
        assert_eq!(SolutionPageExtractor::extract_leaderboard_id(html), None);
        let blank = r#"<p class="correct-submissions" data-directory="  "></p>"#;
        assert_eq!(SolutionPageExtractor::extract_leaderboard_id(blank), None);
    }
}
