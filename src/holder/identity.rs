use serde::{Deserialize, Serialize};

/// Personal data of the holder, as kept by the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Identity {
    pub personal_data: PersonalData,
    pub email: Option<String>,
    pub cell_phone: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalData {
    pub first_names: Option<String>,
    pub last_names: Option<String>,
    pub document: Option<String>,
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub number: Option<String>,
    pub department: Option<String>,
    pub floor: Option<String>,
    pub neighborhood: Option<String>,
    pub post_code: Option<String>,
}
