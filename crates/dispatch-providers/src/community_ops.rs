//! Locally maintained operational profiles. Pure lookup, no I/O.

use dispatch_core::{CommunityOps, Contact, ReferenceTables};

const DISCLAIMER: &str =
    "Verify all operational data before deployment. Contact local EOC for current conditions.";

fn provincial_contacts() -> Vec<Contact> {
    vec![
        Contact {
            organization: "BC Emergency Management".to_string(),
            phone: Some("1-800-663-3456".to_string()),
            email: None,
            notes: None,
        },
        Contact {
            organization: "BC Wildfire Service".to_string(),
            phone: Some("1-888-336-7378".to_string()),
            email: None,
            notes: None,
        },
    ]
}

/// The profile for `community`, or an "unlisted" bundle pointing at the
/// provincial contacts. Never fails.
#[must_use]
pub fn community_ops(tables: &ReferenceTables, community: &str) -> CommunityOps {
    let name = community.trim().to_string();
    match tables.community_ops(community) {
        Some(profile) => CommunityOps {
            community: name,
            data_available: true,
            profile: Some(profile.clone()),
            message: None,
            suggested_contacts: Vec::new(),
            disclaimer: Some(DISCLAIMER.to_string()),
        },
        None => CommunityOps {
            message: Some(format!(
                "Operational data not yet available for {name}. Contact local emergency management for details."
            )),
            community: name,
            data_available: false,
            profile: None,
            suggested_contacts: provincial_contacts(),
            disclaimer: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> &'static ReferenceTables {
        dispatch_core::reference::load().expect("embedded tables parse")
    }

    #[test]
    fn known_community_carries_profile_and_disclaimer() {
        let ops = community_ops(tables(), "Kamloops");
        assert!(ops.data_available);
        assert!(ops.profile.is_some());
        assert!(ops.disclaimer.is_some());
        assert!(ops.suggested_contacts.is_empty());
    }

    #[test]
    fn unknown_community_is_unlisted_not_an_error() {
        let ops = community_ops(tables(), " Tofino ");
        assert!(!ops.data_available);
        assert_eq!(ops.community, "Tofino");
        assert_eq!(
            ops.message.as_deref(),
            Some("Operational data not yet available for Tofino. Contact local emergency management for details.")
        );
        assert_eq!(ops.suggested_contacts.len(), 2);
    }
}
