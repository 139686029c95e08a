//! Property tests for batch ordering and packaging

mod common;

use common::{FakeClient, service, zip_of};
use indexmap::IndexMap;
use proptest::prelude::*;
use redraft::BatchProcessor;
use redraft::services::{package, read_members};
use std::sync::Arc;

fn member_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,8}(/[a-z]{1,8})?\\.txt", 1..8)
        .prop_map(|names| names.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_batch_keeps_archive_order(names in member_names(), binary_mask in prop::collection::vec(any::<bool>(), 8)) {
        let payloads: Vec<Vec<u8>> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if binary_mask[i] {
                    vec![0x00, 0xFF, 0x00]
                } else {
                    format!("content of {}", name).into_bytes()
                }
            })
            .collect();
        let entries: Vec<(&str, &[u8])> = names
            .iter()
            .zip(&payloads)
            .map(|(n, p)| (n.as_str(), p.as_slice()))
            .collect();
        let bytes = zip_of(&entries);

        let processor = BatchProcessor::new(service(Arc::new(FakeClient::new())));
        let result = tokio_test::block_on(processor.process_archive(&bytes, "Edit")).unwrap();

        let expected: Vec<&str> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| !binary_mask[*i])
            .map(|(_, n)| n.as_str())
            .collect();
        prop_assert_eq!(result.names().collect::<Vec<_>>(), expected);
        prop_assert_eq!(result.summary().total(), names.len());
    }

    #[test]
    fn prop_package_round_trip(texts in prop::collection::vec("\\PC{0,64}", 1..6), names in member_names()) {
        let entries: IndexMap<String, String> = names.into_iter().zip(texts).collect();

        let members = read_members(&package(&entries).unwrap()).unwrap().into_members();

        prop_assert_eq!(members.len(), entries.len());
        for (member, (name, text)) in members.iter().zip(&entries) {
            prop_assert_eq!(&member.name, name);
            prop_assert_eq!(member.raw_bytes.as_slice(), text.as_bytes());
        }
    }
}
