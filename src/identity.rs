//! Node identity: the address that receives mining rewards.

use rand::RngCore;

/// 32 lowercase hex chars drawn from the OS-seeded thread RNG.
pub fn generate_node_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
