pub mod state;

pub use state::generate_state;
