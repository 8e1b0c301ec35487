//! Token card view.
//!
//! `TokenCard` renders a token's display model and two mint controls. It owns
//! no state: both controls forward to callbacks supplied by the parent view.
pub mod token_card;

pub use token_card::{dispatch_mint, MintKind, TokenCard, TokenCardProps, TokenDisplayModel, AMOUNT_LABEL};
