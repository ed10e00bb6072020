// SPDX-License-Identifier: Apache-2.0

//! Example signing a transaction against a scripted device
//!
//! This example shows how to:
//! 1. Script a device answer with the mock transport
//! 2. Sign a transaction given as flat JSON arguments
//! 3. Serialize the signed transaction for broadcast
//! 4. Handle a user cancelling on the device

use std::error::Error;

use serde_json::json;
use trezor_eth_app::EthereumApp;
use trezor_transport_mock::{MockReply, MockTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let transport = MockTransport::new();
    transport.push_reply(MockReply::Answer(json!({
        "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
        "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
        "v": "0x25",
    })));
    transport.push_reply(MockReply::Cancel);

    let eth_app = EthereumApp::new(transport);
    let args = json!({
        "derivationPath": "m/44'/60'/0'/0",
        "gasPrice": "4a817c800",
        "gasLimit": "5208",
        "chainId": 1,
        "nonce": "9",
        "to": "0x3535353535353535353535353535353535353535",
        "value": "de0b6b3a7640000",
    });

    println!("✍️  Signing transaction...");
    match eth_app.sign_transaction_json(&args).await? {
        Some(signed) => {
            println!("✅ Transaction signed");
            println!("  r: {}", signed.signature().r);
            println!("  s: {}", signed.signature().s);
            println!("  v: {}", signed.signature().v);
            println!("  raw: {}", signed.to_hex()?);
            println!("  hash: {:?}", signed.hash()?);
        }
        None => println!("⚠️  Signing cancelled"),
    }

    println!("\n✍️  Signing again, the device will reject...");
    match eth_app.sign_transaction_json(&args).await? {
        Some(_) => println!("❓ Unexpected signature"),
        None => println!("✅ Cancellation reported as a warning, no error raised"),
    }

    println!(
        "\n📦 Payloads sent: {}",
        eth_app.transport().dispatch_count()
    );

    Ok(())
}
