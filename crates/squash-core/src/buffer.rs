//! Move-only byte buffers handed between the coordinator and execution units.
//!
//! A [`TransferBuffer`] has exactly one owner at a time. It is not `Clone`, so
//! once it has been moved into a message the sender can no longer reach it.
//! Code that keeps a buffer in a long-lived struct holds it in a
//! [`BufferSlot`], which turns a second take into a [`TransferError`] instead of
//! a silent empty buffer.

use std::fmt;

use thiserror::Error;

/// Raised when a buffer that has already been handed off is requested again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Buffer already transferred: {0}")]
pub struct TransferError(pub &'static str);

/// Exclusively owned bytes.
#[derive(PartialEq, Eq)]
pub struct TransferBuffer(Vec<u8>);

impl TransferBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Give up the buffer wrapper and take the bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for TransferBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for TransferBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransferBuffer({} bytes)", self.0.len())
    }
}

/// A place a [`TransferBuffer`] lives until it is handed off.
#[derive(Debug)]
pub struct BufferSlot {
    name: &'static str,
    buffer: Option<TransferBuffer>,
}

impl BufferSlot {
    /// A slot holding `buffer`.
    pub fn filled(name: &'static str, buffer: TransferBuffer) -> Self {
        Self {
            name,
            buffer: Some(buffer),
        }
    }

    /// An empty slot.
    pub fn empty(name: &'static str) -> Self {
        Self { name, buffer: None }
    }

    /// Move the buffer out. Fails if it was already taken.
    pub fn take(&mut self) -> Result<TransferBuffer, TransferError> {
        self.buffer.take().ok_or(TransferError(self.name))
    }

    /// Store a buffer handed back by the other side.
    pub fn put(&mut self, buffer: TransferBuffer) {
        self.buffer = Some(buffer);
    }

    /// Borrow the buffer if it is still here.
    pub fn get(&self) -> Option<&TransferBuffer> {
        self.buffer.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.buffer.is_some()
    }
}
