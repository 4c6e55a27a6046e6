/// Prompts offered as one-click examples under the prompt box.
pub const EXAMPLE_PROMPTS: &[&str] = &[
    "a tiny astronaut hatching from an egg on the moon",
    "a cat holding a sign that says hello world",
    "an anime illustration of a wiener schnitzel",
];

pub fn example(index: usize) -> Option<&'static str> {
    EXAMPLE_PROMPTS.get(index).copied()
}
