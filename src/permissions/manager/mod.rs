/*!
 * Manager Module
 * Composed protection entry point
 */

mod manager;

pub use manager::ProtectionManager;
