//! # Events Module
//!
//! Event-driven architecture for GUI-ready progress reporting.
//!
//! ## Design
//! The core engine emits events through channels, allowing any UI
//! (CLI, GUI, chat bot) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Scan(ScanEvent::Snapshot(s)) => {
//!                 println!("Scanned {} files", s.files_scanned)
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the scan with the sender
//! scanner.scan_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
