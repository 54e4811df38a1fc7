//! Strongly-typed identifiers used across the domain.
//!
//! The backend keys every table with a positive integer (`id_clienta`,
//! `id_producto`, ...). Each one gets its own newtype so a sale id can never
//! be passed where a client id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $t(i64);

        impl $t {
            /// Wrap a raw identifier, rejecting zero and negative values.
            pub fn new(raw: i64) -> Result<Self, DomainError> {
                if raw <= 0 {
                    return Err(DomainError::invalid_id(format!(
                        "{}: must be a positive integer, got {}",
                        $name, raw
                    )));
                }
                Ok(Self(raw))
            }

            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl TryFrom<i64> for $t {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::new(raw)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a client record (`id_clienta`).
    ClientaId, "id_clienta"
);
numeric_id!(
    /// Identifier of a product (`id_producto`).
    ProductoId, "id_producto"
);
numeric_id!(
    /// Identifier of a service offered (`id_servicio`).
    ServicioId, "id_servicio"
);
numeric_id!(
    /// Identifier of a product sale (`id_venta`).
    VentaId, "id_venta"
);
numeric_id!(
    /// Identifier of a scheduled appointment (`id_atencion`).
    AtencionId, "id_atencion"
);
numeric_id!(
    /// Identifier of a staff member (`id_personal`).
    PersonalId, "id_personal"
);
numeric_id!(
    /// Identifier of a role in the role catalogue (`id_rol`).
    RolId, "id_rol"
);
numeric_id!(
    /// Identifier of a recorded payment.
    PagoId, "id_pago"
);
