//! The fixed DIAN environment catalog: habilitación (test) vs producción.

use serde::{Deserialize, Serialize};

use crate::ids::EnvironmentId;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EnvironmentName {
    Habilitacion,
    Produccion,
}

impl EnvironmentName {
    pub fn is_production(self) -> bool {
        matches!(self, Self::Produccion)
    }

    /// CUFE/CUDE input field 11: `"1"` in production, `"2"` otherwise
    /// (§4.4).
    pub fn cufe_discriminator(self) -> &'static str {
        if self.is_production() {
            "1"
        } else {
            "2"
        }
    }

    pub fn soap_endpoint(self) -> &'static str {
        match self {
            Self::Habilitacion => "https://vpfe-hab.dian.gov.co/WcfDianCustomerServices.svc",
            Self::Produccion => "https://vpfe.dian.gov.co/WcfDianCustomerServices.svc",
        }
    }
}

/// One row of the fixed environment catalog, seeded once at process
/// initialization (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    pub name: EnvironmentName,
    pub soap_endpoint: String,
    pub is_production: bool,
}

impl Environment {
    pub fn seed(id: EnvironmentId, name: EnvironmentName) -> Self {
        Self {
            id,
            soap_endpoint: name.soap_endpoint().to_string(),
            is_production: name.is_production(),
            name,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cufe_discriminator_matches_4_4() {
        assert_eq!(EnvironmentName::Produccion.cufe_discriminator(), "1");
        assert_eq!(EnvironmentName::Habilitacion.cufe_discriminator(), "2");
    }

    #[test]
    fn endpoints_match_6() {
        assert_eq!(
            EnvironmentName::Habilitacion.soap_endpoint(),
            "https://vpfe-hab.dian.gov.co/WcfDianCustomerServices.svc"
        );
        assert_eq!(
            EnvironmentName::Produccion.soap_endpoint(),
            "https://vpfe.dian.gov.co/WcfDianCustomerServices.svc"
        );
    }
}
