pub mod common;

mod test_ai_battles;
