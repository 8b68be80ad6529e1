use super::identity::Identity;

type Accessor = fn(&Identity) -> Option<String>;

/// Own claim keys, lowercased, mapped to the identity field they disclose.
pub static OWN_CLAIM_SYNONYMS: &[(&[&str], Accessor)] = &[
    (&["nombre", "names", "firstnames"], first_names),
    (&["apellido", "lastnames"], last_names),
    (&["dni", "document"], document),
    (&["name", "full name"], full_name),
    (&["email"], email),
    (&["country", "nationality"], nationality),
    (&["cellphone", "phone"], cell_phone),
    (&["street", "streetaddress"], street),
    (&["numberstreet", "addressnumber"], street_number),
    (&["department"], department),
    (&["floor"], floor),
    (&["city", "neighborhood"], neighborhood),
    (&["zipcode", "postcode"], post_code),
];

/// Value disclosed for an own claim key, if the key is known and its field is filled.
pub fn own_claim_value(key: &str, identity: &Identity) -> Option<String> {
    let key = key.to_lowercase();
    let (_, accessor) = OWN_CLAIM_SYNONYMS
        .iter()
        .find(|(synonyms, _)| synonyms.contains(&key.as_str()))?;
    accessor(identity).filter(|value| !value.is_empty())
}

fn first_names(identity: &Identity) -> Option<String> {
    identity.personal_data.first_names.clone()
}

fn last_names(identity: &Identity) -> Option<String> {
    identity.personal_data.last_names.clone()
}

fn document(identity: &Identity) -> Option<String> {
    identity.personal_data.document.clone()
}

fn full_name(identity: &Identity) -> Option<String> {
    let first = first_names(identity).filter(|s| !s.is_empty())?;
    let last = last_names(identity).filter(|s| !s.is_empty())?;
    Some(format!("{first} {last}"))
}

fn email(identity: &Identity) -> Option<String> {
    identity.email.clone()
}

fn nationality(identity: &Identity) -> Option<String> {
    identity.personal_data.nationality.clone()
}

fn cell_phone(identity: &Identity) -> Option<String> {
    identity.cell_phone.clone()
}

fn street(identity: &Identity) -> Option<String> {
    identity.address.street.clone()
}

fn street_number(identity: &Identity) -> Option<String> {
    identity.address.number.clone()
}

fn department(identity: &Identity) -> Option<String> {
    identity.address.department.clone()
}

fn floor(identity: &Identity) -> Option<String> {
    identity.address.floor.clone()
}

fn neighborhood(identity: &Identity) -> Option<String> {
    identity.address.neighborhood.clone()
}

fn post_code(identity: &Identity) -> Option<String> {
    identity.address.post_code.clone()
}
