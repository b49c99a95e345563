pub mod card_deck;
pub mod name_input;
pub mod task_description;
