// SPDX-License-Identifier: Apache-2.0

//! Example signing a personal message against a scripted device

use std::error::Error;

use serde_json::json;
use trezor_eth_app::{BipPath, EthereumApp, SignMessageParams};
use trezor_transport_mock::MockTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let transport = MockTransport::answering(json!({
        "address": "0x742d35cc6535c244b8c80a79d5d22efeadba5b90",
        "signature": "1b".repeat(65),
    }));
    let eth_app = EthereumApp::new(transport);

    let message = "Hello, Trezor!";
    println!("📝 Signing message: \"{}\"", message);

    // account 0, address 0
    let path = BipPath::ethereum_standard(0, 0);
    println!("🔑 Derivation path: {}", path);

    let params = SignMessageParams::new(path.to_string(), message);
    match eth_app.sign_personal_message(params).await {
        Ok(Some(signature)) => {
            println!("✅ Message signed");
            println!("  Address: {}", signature.address);
            println!("  Signature: {}", signature.signature);
        }
        Ok(None) => println!("⚠️  Signing cancelled"),
        Err(e) => eprintln!("❌ Failed to sign message: {}", e),
    }

    Ok(())
}
