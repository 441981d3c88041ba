//! Static bidirectional MIB name registry.
//!
//! The object table below is the same vocabulary the reference codebase
//! hard-coded as bare `[u32; N]` constants in `snmp::oids` (system group,
//! IF-MIB, BRIDGE-MIB, IP-MIB, ENTITY-MIB, LLDP-MIB, CISCO-CDP-MIB,
//! VLAN and PoE tables), reorganized into a name<->OID map with instance
//! and ancestor resolution. The MIB *text* compiler that would normally
//! produce this table is out of scope; this is the static registry it
//! would hand off to.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{Result, SnmpError};
use crate::snmp::oid::Oid;

macro_rules! mib_table {
    ($(($name:ident, $oid_name:literal, [$($c:expr),+ $(,)?])),+ $(,)?) => {
        $(
            pub const $name: &[u32] = &[$($c),+];
        )+

        fn entries() -> &'static [(&'static str, &'static [u32])] {
            &[$(($oid_name, $name)),+]
        }
    };
}

mib_table! {
    (SYS_DESCR, "sysDescr", [1, 3, 6, 1, 2, 1, 1, 1]),
    (SYS_OBJECT_ID, "sysObjectID", [1, 3, 6, 1, 2, 1, 1, 2]),
    (SYS_UPTIME, "sysUpTime", [1, 3, 6, 1, 2, 1, 1, 3]),
    (SYS_CONTACT, "sysContact", [1, 3, 6, 1, 2, 1, 1, 4]),
    (SYS_NAME, "sysName", [1, 3, 6, 1, 2, 1, 1, 5]),
    (SYS_LOCATION, "sysLocation", [1, 3, 6, 1, 2, 1, 1, 6]),
    (SYS_SERVICES, "sysServices", [1, 3, 6, 1, 2, 1, 1, 7]),

    (IF_NUMBER, "ifNumber", [1, 3, 6, 1, 2, 1, 2, 1]),
    (IF_INDEX, "ifIndex", [1, 3, 6, 1, 2, 1, 2, 2, 1, 1]),
    (IF_DESCR, "ifDescr", [1, 3, 6, 1, 2, 1, 2, 2, 1, 2]),
    (IF_TYPE, "ifType", [1, 3, 6, 1, 2, 1, 2, 2, 1, 3]),
    (IF_MTU, "ifMtu", [1, 3, 6, 1, 2, 1, 2, 2, 1, 4]),
    (IF_SPEED, "ifSpeed", [1, 3, 6, 1, 2, 1, 2, 2, 1, 5]),
    (IF_PHYS_ADDRESS, "ifPhysAddress", [1, 3, 6, 1, 2, 1, 2, 2, 1, 6]),
    (IF_ADMIN_STATUS, "ifAdminStatus", [1, 3, 6, 1, 2, 1, 2, 2, 1, 7]),
    (IF_OPER_STATUS, "ifOperStatus", [1, 3, 6, 1, 2, 1, 2, 2, 1, 8]),
    (IF_LAST_CHANGE, "ifLastChange", [1, 3, 6, 1, 2, 1, 2, 2, 1, 9]),
    (IF_IN_OCTETS, "ifInOctets", [1, 3, 6, 1, 2, 1, 2, 2, 1, 10]),
    (IF_OUT_OCTETS, "ifOutOctets", [1, 3, 6, 1, 2, 1, 2, 2, 1, 16]),

    (IF_NAME, "ifName", [1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1]),
    (IF_HIGH_SPEED, "ifHighSpeed", [1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 15]),
    (IF_ALIAS, "ifAlias", [1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18]),

    (DOT1D_TP_FDB_ADDRESS, "dot1dTpFdbAddress", [1, 3, 6, 1, 2, 1, 17, 4, 3, 1, 1]),
    (DOT1D_TP_FDB_PORT, "dot1dTpFdbPort", [1, 3, 6, 1, 2, 1, 17, 4, 3, 1, 2]),
    (DOT1D_TP_FDB_STATUS, "dot1dTpFdbStatus", [1, 3, 6, 1, 2, 1, 17, 4, 3, 1, 3]),
    (DOT1Q_TP_FDB_PORT, "dot1qTpFdbPort", [1, 3, 6, 1, 2, 1, 17, 7, 1, 2, 2, 1, 2]),

    (IP_NET_TO_MEDIA_PHYS, "ipNetToMediaPhysAddress", [1, 3, 6, 1, 2, 1, 4, 22, 1, 2]),
    (IP_NET_TO_MEDIA_TYPE, "ipNetToMediaType", [1, 3, 6, 1, 2, 1, 4, 22, 1, 4]),

    (ENT_PHYSICAL_DESCR, "entPhysicalDescr", [1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 2]),
    (ENT_PHYSICAL_CLASS, "entPhysicalClass", [1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 5]),
    (ENT_PHYSICAL_NAME, "entPhysicalName", [1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 7]),
    (ENT_PHYSICAL_HW_REV, "entPhysicalHardwareRev", [1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 8]),
    (ENT_PHYSICAL_FW_REV, "entPhysicalFirmwareRev", [1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 9]),
    (ENT_PHYSICAL_SW_REV, "entPhysicalSoftwareRev", [1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 10]),
    (ENT_PHYSICAL_SERIAL, "entPhysicalSerialNum", [1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 11]),
    (ENT_PHYSICAL_MODEL, "entPhysicalModelName", [1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 13]),

    (LLDP_REM_SYS_NAME, "lldpRemSysName", [1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 9]),
    (LLDP_REM_SYS_DESC, "lldpRemSysDesc", [1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 10]),
    (LLDP_REM_PORT_ID, "lldpRemPortId", [1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 7]),
    (LLDP_REM_MAN_ADDR, "lldpRemManAddr", [1, 0, 8802, 1, 1, 2, 1, 4, 2, 1, 1]),

    (CDP_CACHE_DEVICE_ID, "cdpCacheDeviceId", [1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 6]),
    (CDP_CACHE_DEVICE_PORT, "cdpCacheDevicePort", [1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 7]),
    (CDP_CACHE_ADDRESS, "cdpCacheAddress", [1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 4]),
    (CDP_CACHE_PLATFORM, "cdpCachePlatform", [1, 3, 6, 1, 4, 1, 9, 9, 23, 1, 2, 1, 8]),

    (VTP_VLAN_STATE, "vtpVlanState", [1, 3, 6, 1, 4, 1, 9, 9, 46, 1, 3, 1, 1, 2]),
    (VTP_VLAN_NAME, "vtpVlanName", [1, 3, 6, 1, 4, 1, 9, 9, 46, 1, 3, 1, 1, 4]),
    (DOT1Q_VLAN_STATIC_NAME, "dot1qVlanStaticName", [1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 1]),

    (PSE_PORT_ADMIN, "pethPsePortAdminEnable", [1, 3, 6, 1, 2, 1, 105, 1, 1, 1, 1, 3]),
    (PSE_PORT_STATUS, "pethPsePortDetectionStatus", [1, 3, 6, 1, 2, 1, 105, 1, 1, 1, 1, 6]),
    (PSE_PORT_POWER, "pethPsePortPowerClassifications", [1, 3, 6, 1, 2, 1, 105, 1, 1, 1, 1, 7]),
}

struct Registry {
    by_name: HashMap<&'static str, Oid>,
    by_oid: HashMap<Oid, &'static str>,
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut by_name = HashMap::new();
        let mut by_oid = HashMap::new();
        for (name, components) in entries() {
            let oid = Oid::from(*components);
            by_name.insert(*name, oid.clone());
            by_oid.insert(oid, *name);
        }
        Registry { by_name, by_oid }
    })
}

/// Resolve a symbolic name, optionally followed by a dotted instance
/// suffix (e.g. `sysDescr.0` or `ifDescr.1`), to a concrete OID.
pub fn resolve(name: &str) -> Result<Oid> {
    let (base_name, instance) = match name.split_once('.') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (name, None),
    };
    let base = registry()
        .by_name
        .get(base_name)
        .cloned()
        .ok_or_else(|| SnmpError::NotFound(name.to_string()))?;
    match instance {
        None => Ok(base),
        Some(suffix) => {
            let mut components = base.into_vec();
            for part in suffix.split('.') {
                let n = part
                    .parse::<u32>()
                    .map_err(|_| SnmpError::NotFound(name.to_string()))?;
                components.push(n);
            }
            Oid::new(components)
        }
    }
}

/// Reverse lookup: the longest registered name that is a prefix of `oid`,
/// plus the remaining instance suffix (empty if `oid` is an exact match).
/// Falls back to the numeric dotted string when no ancestor is registered.
pub fn reverse_lookup(oid: &Oid) -> String {
    let reg = registry();
    if let Some(name) = reg.by_oid.get(oid) {
        return (*name).to_string();
    }
    let mut best: Option<(&'static str, &Oid)> = None;
    for (candidate_oid, name) in &reg.by_oid {
        if oid.has_prefix(candidate_oid) {
            let is_longer = best
                .map(|(_, best_oid)| candidate_oid.len() > best_oid.len())
                .unwrap_or(true);
            if is_longer {
                best = Some((name, candidate_oid));
            }
        }
    }
    match best {
        Some((name, base_oid)) => {
            let suffix = Oid::table_index(oid, base_oid)
                .map(|s| s.to_dotted_string())
                .unwrap_or_default();
            if suffix.is_empty() {
                name.to_string()
            } else {
                format!("{name}.{suffix}")
            }
        }
        None => oid.to_dotted_string(),
    }
}

/// Names whose OID is exactly one component longer than `oid` (i.e. direct
/// children in the registry, not the whole subtree).
pub fn children(oid: &Oid) -> Vec<&'static str> {
    registry()
        .by_oid
        .iter()
        .filter(|(candidate, _)| candidate.is_child_of(oid) && candidate.len() == oid.len() + 1)
        .map(|(_, name)| *name)
        .collect()
}
