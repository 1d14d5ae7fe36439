//! Deposit metadata construction
//!
//! Maps a publication row onto the InvenioRDM deposit payload. The
//! publication date is injected by the caller, which keeps the mapping a
//! pure function.

use crate::adapters::freidata::models::{
    AccessSettings, Affiliation, Creator, CreatorIdentifier, DepositMetadata, FilesSettings,
    PersonOrOrg, RecordMetadata, ResourceType, RightsEntry,
};
use crate::domain::{Author, Publication};
use chrono::NaiveDate;

/// Publisher recorded on every deposit
pub const PUBLISHER: &str = "deadtrees.earth";

/// InvenioRDM resource type of every deposit
pub const RESOURCE_TYPE_ID: &str = "dataset";

/// License recorded on every deposit
pub const LICENSE_ID: &str = "cc-by-4.0";

/// Build the deposit payload for a publication
pub fn build_deposit(publication: &Publication, publication_date: NaiveDate) -> DepositMetadata {
    DepositMetadata {
        access: AccessSettings::default(),
        files: FilesSettings { enabled: true },
        metadata: RecordMetadata {
            resource_type: ResourceType {
                id: RESOURCE_TYPE_ID.to_string(),
            },
            title: publication.title.clone(),
            description: publication.description.clone(),
            publication_date: publication_date.format("%Y-%m-%d").to_string(),
            publisher: PUBLISHER.to_string(),
            creators: creators_from_authors(&publication.authors),
            rights: vec![RightsEntry {
                id: LICENSE_ID.to_string(),
            }],
        },
    }
}

/// Map authors to creators, falling back to the platform as organization
fn creators_from_authors(authors: &[Author]) -> Vec<Creator> {
    if authors.is_empty() {
        return vec![Creator {
            person_or_org: PersonOrOrg {
                kind: "organizational".to_string(),
                name: Some(PUBLISHER.to_string()),
                given_name: None,
                family_name: None,
                identifiers: Vec::new(),
            },
            affiliations: None,
        }];
    }

    authors.iter().map(creator_from_author).collect()
}

fn creator_from_author(author: &Author) -> Creator {
    let identifiers = author
        .orcid
        .iter()
        .map(|orcid| CreatorIdentifier {
            scheme: "orcid".to_string(),
            identifier: orcid.clone(),
        })
        .collect();

    let affiliations = author
        .organization
        .as_ref()
        .map(|org| vec![Affiliation { name: org.clone() }]);

    Creator {
        person_or_org: PersonOrOrg {
            kind: "personal".to_string(),
            name: None,
            given_name: Some(author.given_name.clone()),
            family_name: Some(author.family_name.clone()),
            identifiers,
        },
        affiliations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PublicationStatus;

    fn sample_publication() -> Publication {
        Publication {
            id: 36,
            title: "Östra Göinge, Sweden".to_string(),
            description: "UAV orthophotos of standing deadwood".to_string(),
            authors: vec![Author {
                given_name: "Anna".to_string(),
                family_name: "Lind".to_string(),
                organization: Some("University of Freiburg".to_string()),
                orcid: Some("0000-0002-1825-0097".to_string()),
            }],
            status: PublicationStatus::Pending,
            doi: None,
            freidata_record_id: None,
            notified_at: None,
            dataset_ids: vec![101, 102],
        }
    }

    #[test]
    fn test_deposit_carries_platform_constants() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let deposit = build_deposit(&sample_publication(), date);

        assert_eq!(deposit.metadata.resource_type.id, "dataset");
        assert_eq!(deposit.metadata.publisher, "deadtrees.earth");
        assert_eq!(deposit.metadata.rights[0].id, "cc-by-4.0");
        assert_eq!(deposit.metadata.publication_date, "2026-08-25");
        assert!(deposit.files.enabled);
        assert_eq!(deposit.access.record, "public");
    }

    #[test]
    fn test_author_maps_to_personal_creator() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let deposit = build_deposit(&sample_publication(), date);

        let creator = &deposit.metadata.creators[0];
        assert_eq!(creator.person_or_org.kind, "personal");
        assert_eq!(creator.person_or_org.given_name.as_deref(), Some("Anna"));
        assert_eq!(creator.person_or_org.family_name.as_deref(), Some("Lind"));
        assert_eq!(creator.person_or_org.identifiers[0].scheme, "orcid");
        assert_eq!(
            creator.affiliations.as_ref().unwrap()[0].name,
            "University of Freiburg"
        );
    }

    #[test]
    fn test_empty_authors_fall_back_to_organization() {
        let mut publication = sample_publication();
        publication.authors.clear();

        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let deposit = build_deposit(&publication, date);

        assert_eq!(deposit.metadata.creators.len(), 1);
        let creator = &deposit.metadata.creators[0];
        assert_eq!(creator.person_or_org.kind, "organizational");
        assert_eq!(creator.person_or_org.name.as_deref(), Some("deadtrees.earth"));
        assert!(creator.person_or_org.given_name.is_none());
    }
}
