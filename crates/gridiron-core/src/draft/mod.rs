pub mod needs;
pub mod order;
pub mod state;
