use super::Macros;

/// Canned estimates used when no completion endpoint is configured.
/// Order matters only for equal-length keywords: the earlier entry wins.
const KEYWORD_TABLE: &[(&str, Macros)] = &[
    ("2 eggs", Macros::new(140.0, 12.0, 0.0, 10.0)),
    ("toast", Macros::new(80.0, 3.0, 15.0, 1.0)),
    ("chicken", Macros::new(165.0, 31.0, 0.0, 3.6)),
    ("rice", Macros::new(130.0, 2.7, 28.0, 0.3)),
    ("apple", Macros::new(95.0, 0.5, 25.0, 0.3)),
    ("salmon", Macros::new(208.0, 25.0, 0.0, 12.0)),
    ("pasta", Macros::new(131.0, 5.0, 25.0, 1.1)),
    ("bread", Macros::new(80.0, 3.0, 15.0, 1.0)),
    ("milk", Macros::new(103.0, 8.0, 12.0, 2.4)),
    ("banana", Macros::new(105.0, 1.3, 27.0, 0.4)),
];

const GENERIC_MEAL: Macros = Macros::new(200.0, 10.0, 20.0, 8.0);

/// Longest keyword contained in `text` (case-insensitive) decides the estimate.
pub fn estimate_from_keywords(text: &str) -> Macros {
    let haystack = text.to_lowercase();
    let mut best: Option<(usize, Macros)> = None;
    for (keyword, macros) in KEYWORD_TABLE {
        if !haystack.contains(keyword) {
            continue;
        }
        let score = keyword.len();
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, *macros));
        }
    }
    best.map(|(_, m)| m).unwrap_or(GENERIC_MEAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_eggs_matches_exactly() {
        assert_eq!(
            estimate_from_keywords("2 eggs"),
            Macros::new(140.0, 12.0, 0.0, 10.0)
        );
    }

    #[test]
    fn longest_keyword_wins() {
        // "chicken" (7) beats "rice" (4)
        assert_eq!(
            estimate_from_keywords("grilled chicken rice"),
            Macros::new(165.0, 31.0, 0.0, 3.6)
        );
        // "salmon" (6) beats "rice" (4) regardless of position
        assert_eq!(
            estimate_from_keywords("rice with salmon"),
            Macros::new(208.0, 25.0, 0.0, 12.0)
        );
    }

    #[test]
    fn equal_length_ties_go_to_table_order() {
        // "toast", "apple", "pasta" and "bread" are all five letters
        assert_eq!(
            estimate_from_keywords("bread and apple"),
            Macros::new(95.0, 0.5, 25.0, 0.3)
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(estimate_from_keywords("BANANA smoothie").calories, 105.0);
    }

    #[test]
    fn unknown_food_gets_generic_default() {
        assert_eq!(estimate_from_keywords("quinoa bowl"), GENERIC_MEAL);
        assert_eq!(estimate_from_keywords("3 eggs"), GENERIC_MEAL);
    }

    #[test]
    fn table_values_are_non_negative_and_stable() {
        for (keyword, macros) in KEYWORD_TABLE {
            assert!(macros.calories >= 0.0 && macros.protein >= 0.0);
            assert!(macros.carbs >= 0.0 && macros.fat >= 0.0);
            assert_eq!(estimate_from_keywords(keyword), estimate_from_keywords(keyword));
        }
    }
}
