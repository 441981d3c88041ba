//! One-shot convenience wrappers for scripts that don't want to manage
//! an [`Engine`] themselves. Each function binds a fresh engine via
//! [`crate::default_engine`] and delegates to the explicit form in
//! `snmp::client`/`snmp::walk`/`snmp::multi`, which remains the
//! canonical way to call repeatedly against one shared socket.

use crate::config::ClientOptions;
use crate::error::Result;
use crate::snmp::client::Target;
use crate::snmp::multi::{self, ReturnFormat, Shaped};
use crate::snmp::oid::Oid;
use crate::snmp::pdu::Varbind;

/// See [`crate::snmp::client::get`].
pub async fn get(target: &Target, oids: &[Oid], opts: &ClientOptions) -> Result<Vec<Varbind>> {
    let engine = crate::default_engine().await?;
    crate::snmp::client::get(&engine, target, oids, opts).await
}

/// See [`crate::snmp::client::get_next`].
pub async fn get_next(target: &Target, oids: &[Oid], opts: &ClientOptions) -> Result<Vec<Varbind>> {
    let engine = crate::default_engine().await?;
    crate::snmp::client::get_next(&engine, target, oids, opts).await
}

/// See [`crate::snmp::client::set`].
pub async fn set(target: &Target, varbinds: Vec<Varbind>, opts: &ClientOptions) -> Result<Vec<Varbind>> {
    let engine = crate::default_engine().await?;
    crate::snmp::client::set(&engine, target, varbinds, opts).await
}

/// See [`crate::snmp::client::get_bulk`].
pub async fn get_bulk(
    target: &Target,
    non_repeaters: u32,
    max_repetitions: u32,
    oids: &[Oid],
    opts: &ClientOptions,
) -> Result<Vec<Varbind>> {
    let engine = crate::default_engine().await?;
    crate::snmp::client::get_bulk(&engine, target, non_repeaters, max_repetitions, oids, opts).await
}

/// See [`crate::snmp::walk::walk`].
pub async fn walk(target: &Target, root: Oid, opts: &ClientOptions) -> Result<Vec<Varbind>> {
    let engine = crate::default_engine().await?;
    crate::snmp::walk::walk(&engine, target, root, opts).await
}

/// See [`crate::snmp::multi::get_multi`].
pub async fn get_multi(
    targets_and_oids: Vec<(Target, Vec<Oid>)>,
    opts: &ClientOptions,
    format: ReturnFormat,
) -> Result<Shaped<Vec<Varbind>>> {
    let engine = crate::default_engine().await?;
    multi::get_multi(&engine, targets_and_oids, opts, format).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::host::Endpoint;
    use crate::snmp::message::SnmpVersion;

    #[tokio::test]
    async fn get_without_an_engine_still_times_out_cleanly() {
        let target = Target::new(Endpoint::new("198.51.100.1", 161).unwrap(), b"public".to_vec(), SnmpVersion::V2c);
        let opts = ClientOptions {
            timeout_ms: 50,
            retries: 0,
            ..ClientOptions::default()
        };
        let err = get(&target, &[Oid::from_str("1.3.6.1.2.1.1.1.0").unwrap()], &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::SnmpError::Timeout(_)));
    }
}
