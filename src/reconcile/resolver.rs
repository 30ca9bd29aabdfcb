//! Tab-name attribution for resolved categories.

use crate::spreadsheet::criteria::Criteria;

/// Stable-sorts candidates so tabs carrying the month token (`3月`) come first.
/// Encounter order is otherwise preserved; no other ranking is applied.
pub fn sort_by_month_token<T, F>(candidates: &mut [T], criteria: &Criteria, tab_name: F)
where
    F: Fn(&T) -> &str,
{
    candidates.sort_by_key(|candidate| !criteria.accept(tab_name(candidate)));
}

/// Joins the names of tabs that contributed rows, for display.
pub fn join_tab_names(names: &[String]) -> String {
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str], month: u32) -> Vec<String> {
        let criteria = Criteria::new(month).expect("criteria");
        let mut names: Vec<String> = names.iter().map(|it| it.to_string()).collect();
        sort_by_month_token(&mut names, &criteria, |name| name.as_str());
        names
    }

    #[test]
    fn test_month_token_first() {
        assert_eq!(sorted(&["2月班表A", "班表B"], 2)[0], "2月班表A");
        assert_eq!(sorted(&["班表B", "2月班表A"], 2)[0], "2月班表A");
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        assert_eq!(sorted(&["班表B", "班表C", "3月班表", "3月班表(修)"], 3), vec![
            "3月班表", "3月班表(修)", "班表B", "班表C"
        ]);
        assert_eq!(sorted(&["班表C", "班表B"], 5), vec!["班表C", "班表B"]);
    }

    #[test]
    fn test_join_tab_names() {
        assert_eq!(join_tab_names(&["出勤時數(3月)".to_owned(), "出勤時數(補登)".to_owned()]), "出勤時數(3月), 出勤時數(補登)");
        assert_eq!(join_tab_names(&[]), "");
    }
}
