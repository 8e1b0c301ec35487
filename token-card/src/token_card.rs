use leptos::*;
use serde::{Deserialize, Serialize};

/// Caption under the claimable amount.
pub const AMOUNT_LABEL: &str = "Claim amount";

/// What the parent view knows about a token. Field names follow the camelCase
/// JSON the frontend exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDisplayModel {
    pub name: String,
    pub symbol: String,
    pub icon: String,
    /// Theme key, used as an extra class on the icon.
    pub color: String,
    pub display_amount: String,
    pub token_type: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintKind {
    Clear,
    Encrypted,
}

impl MintKind {
    pub fn label(self, symbol: &str) -> String {
        match self {
            MintKind::Clear => format!("Mint {} (clear)", symbol),
            MintKind::Encrypted => format!("Mint {} (encrypted)", symbol),
        }
    }
}

/// Forwards a mint control activation to its callback. A panic inside the
/// callback reaches the caller.
pub fn dispatch_mint(kind: MintKind, on_mint_clear: Callback<()>, on_mint_encrypted: Callback<()>) {
    match kind {
        MintKind::Clear => on_mint_clear.call(()),
        MintKind::Encrypted => on_mint_encrypted.call(()),
    }
}

#[component]
pub fn TokenCard(
    token: TokenDisplayModel,
    #[prop(into)] on_mint_clear: Callback<()>,
    #[prop(into)] on_mint_encrypted: Callback<()>,
) -> impl IntoView {
    let TokenDisplayModel {
        name,
        symbol,
        icon,
        color,
        display_amount,
        ..
    } = token;
    let icon_class = format!("token-icon {}", color);
    let clear_label = MintKind::Clear.label(&symbol);
    let encrypted_label = MintKind::Encrypted.label(&symbol);

    view! {
        <div class="token-card">
            <div class=icon_class>{icon}</div>
            <h3>{name}</h3>
            <p style="color: #666; font-size: 14px; margin-bottom: 8px">{symbol}</p>
            <div style="background: #f8f9fa; padding: 12px; border-radius: 8px; margin-bottom: 16px">
                <div style="font-size: 18px; font-weight: bold; color: #28a745">{display_amount}</div>
                <div style="font-size: 12px; color: #666">{AMOUNT_LABEL}</div>
            </div>
            <button
                class="button"
                style="margin-top: 8px"
                on:click=move |_| dispatch_mint(MintKind::Clear, on_mint_clear, on_mint_encrypted)
            >
                {clear_label}
            </button>
            <button
                class="button"
                style="margin-top: 8px"
                on:click=move |_| dispatch_mint(MintKind::Encrypted, on_mint_clear, on_mint_encrypted)
            >
                {encrypted_label}
            </button>
        </div>
    }
}
