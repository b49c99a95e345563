mod components;
mod poker_page;
mod section;

pub use self::poker_page::PokerPage;
