//! SNMP v1/v2c toolkit: BER codec, PDU/message framing, a MIB name
//! registry, target/endpoint parsing, the UDP transport and request
//! correlation engine, and the single- and multi-target operations built
//! on top of them.

pub mod ber;
pub mod client;
pub mod convenience;
pub mod engine;
pub mod host;
pub mod message;
pub mod mib;
pub mod multi;
pub mod oid;
pub mod pdu;
pub mod transport;
pub mod value;
pub mod walk;

pub use client::{get, get_bulk, get_next, set, Target};
pub use engine::Engine;
pub use host::Endpoint;
pub use message::{Message, SnmpVersion};
pub use multi::{fan_out, get_multi, is_global_failure, shape_results, ReturnFormat, Shaped};
pub use oid::Oid;
pub use pdu::{ErrorStatus, Pdu, PduKind, Varbind};
pub use value::{Value, ValueType};
pub use walk::{walk, WalkStream};
