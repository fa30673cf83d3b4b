use lazy_static::lazy_static;
use regex::Regex;

pub const MAX_SUGGESTIONS: usize = 5;

pub const COMMON_FOODS: [&str; 26] = [
    "Apple",
    "Avocado",
    "Banana",
    "Blueberries",
    "Broccoli",
    "Chicken Breast",
    "Greek Yogurt",
    "Egg",
    "Oatmeal",
    "Salmon",
    "Spinach",
    "Sweet Potato",
    "Almonds",
    "Rice",
    "Quinoa",
    "Beef",
    "Tofu",
    "Lentils",
    "Orange Juice",
    "Latte",
    "Smoothie",
    "Pasta",
    "Bread",
    "Butter",
    "Salad",
    "Burrito",
];

lazy_static! {
    static ref SEPARATOR_RE: Regex = Regex::new(r"[,\s]+").unwrap();
}

/// Byte offset where the fragment being typed starts.
fn fragment_start(input: &str) -> usize {
    SEPARATOR_RE
        .find_iter(input)
        .last()
        .map(|m| m.end())
        .unwrap_or(0)
}

pub(crate) fn trailing_fragment(input: &str) -> &str {
    &input[fragment_start(input)..]
}

/// Dictionary names completing the fragment currently being typed.
pub fn suggest(input: &str) -> Vec<&'static str> {
    suggest_from(&COMMON_FOODS, input)
}

pub(crate) fn suggest_from(dictionary: &[&'static str], input: &str) -> Vec<&'static str> {
    let fragment = trailing_fragment(input);
    if fragment.chars().count() <= 1 {
        return Vec::new();
    }
    let needle = fragment.to_lowercase();
    dictionary
        .iter()
        .copied()
        .filter(|food| food.to_lowercase().starts_with(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Replaces the trailing fragment with `choice` and a `", "` separator.
pub fn apply_suggestion(input: &str, choice: &str) -> String {
    let kept = &input[..fragment_start(input)];
    format!("{kept}{choice}, ")
}
