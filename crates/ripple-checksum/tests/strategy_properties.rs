//! Behavioural tests for the update strategies.
//!
//! Every strategy must leave the table equal to a fresh rebuild, must not
//! touch entries before the replaced index, and Ripple must read raw content
//! for the replaced block only.

use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use ripple_checksum::{
    apply, ripple, BlockSequence, ChecksumFunction, ChecksumTable, CountingSource, Crc32,
    Crc32Value, RippleError, StrategyKind,
};

fn random_block(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect()
}

fn random_sequence(seed: u64, sizes: &[usize]) -> BlockSequence {
    let mut rng = StdRng::seed_from_u64(seed);
    BlockSequence::new(sizes.iter().map(|&len| random_block(&mut rng, len)))
}

/// Replace block `index`, run `kind`, and return (before, after) tables.
fn replace_and_update(
    kind: StrategyKind,
    seq: &mut BlockSequence,
    index: usize,
    content: Vec<u8>,
) -> (ChecksumTable<Crc32Value>, ChecksumTable<Crc32Value>) {
    let algebra = Crc32::new();
    let before = ChecksumTable::rebuild(&algebra, &*seq).unwrap();
    let mut after = before.clone();
    seq.replace(index, content).unwrap();
    apply(kind, &algebra, &*seq, &mut after, index).unwrap();
    (before, after)
}

/// Five blocks of sizes [10, 20, 15, 30, 5]; block 2 replaced with 15 new bytes.
#[test]
fn concrete_scenario_ripple_reads_only_replaced_block() {
    let algebra = Crc32::new();
    let mut seq = random_sequence(7, &[10, 20, 15, 30, 5]);
    let mut table = ChecksumTable::rebuild(&algebra, &seq).unwrap();
    let original = table.clone();

    seq.replace(2, b"fifteen-bytes!!".to_vec()).unwrap();
    let counting = CountingSource::new(&seq);
    ripple::update(&algebra, &counting, &mut table, 2).unwrap();

    let expected = ChecksumTable::rebuild(&algebra, &seq).unwrap();
    for index in 0..5 {
        assert_eq!(table.get(index).unwrap(), expected.get(index).unwrap());
    }
    assert_eq!(counting.read_count(), 1);
    assert_eq!(counting.indices_read(), vec![2]);
    assert_eq!(counting.bytes_read(), 15);
    assert_eq!(&table.entries()[..2], &original.entries()[..2]);
    assert_ne!(table.get(2).unwrap(), original.get(2).unwrap());
}

#[test]
fn all_strategies_agree_on_concrete_scenario() {
    let algebra = Crc32::new();
    let base = random_sequence(11, &[10, 20, 15, 30, 5]);
    let mut tables = Vec::new();

    for kind in StrategyKind::ALL {
        let mut seq = base.clone();
        let (_, after) = replace_and_update(kind, &mut seq, 2, vec![b'x'; 15]);
        after.verify(&algebra, &seq).unwrap();
        tables.push(after);
    }
    assert_eq!(tables[0], tables[1]);
    assert_eq!(tables[1], tables[2]);
}

#[test]
fn first_and_last_index_boundaries() {
    let algebra = Crc32::new();
    for kind in StrategyKind::ALL {
        for index in [0, 4] {
            let mut seq = random_sequence(3, &[10, 20, 15, 30, 5]);
            let (_, after) = replace_and_update(kind, &mut seq, index, b"boundary".to_vec());
            after
                .verify(&algebra, &seq)
                .unwrap_or_else(|e| panic!("{kind} at index {index}: {e}"));
        }
    }
}

#[test]
fn identical_replacement_leaves_table_unchanged() {
    for kind in StrategyKind::ALL {
        let mut seq = random_sequence(5, &[10, 20, 15, 30, 5]);
        let same = seq.get(3).unwrap().content().to_vec();
        let (before, after) = replace_and_update(kind, &mut seq, 3, same);
        assert_eq!(before, after, "{kind} changed the table for identical content");
    }
}

#[test]
fn out_of_range_index_is_rejected() {
    let algebra = Crc32::new();
    let seq = random_sequence(1, &[4, 4, 4]);
    let mut table = ChecksumTable::rebuild(&algebra, &seq).unwrap();
    let before = table.clone();

    for kind in StrategyKind::ALL {
        let err = apply(kind, &algebra, &seq, &mut table, 3).unwrap_err();
        assert!(matches!(err, RippleError::IndexOutOfRange { index: 3, len: 3 }));
    }
    assert_eq!(table, before);

    let empty = BlockSequence::default();
    let mut empty_table = ChecksumTable::rebuild(&algebra, &empty).unwrap();
    assert!(matches!(
        apply(StrategyKind::Ripple, &algebra, &empty, &mut empty_table, 0),
        Err(RippleError::IndexOutOfRange { index: 0, len: 0 })
    ));
}

#[test]
fn misaligned_table_is_rejected() {
    let algebra = Crc32::new();
    let short = random_sequence(1, &[4, 4]);
    let long = random_sequence(1, &[4, 4, 4]);
    let mut table = ChecksumTable::rebuild(&algebra, &short).unwrap();

    assert!(matches!(
        apply(StrategyKind::Naive, &algebra, &long, &mut table, 1),
        Err(RippleError::LengthMismatch { table: 2, blocks: 3 })
    ));
}

#[test]
fn single_byte_modification_matches_rebuild() {
    let algebra = Crc32::new();
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let mut seq = BlockSequence::from_chunks(&data, 1024).unwrap();
    let mut table = ChecksumTable::rebuild(&algebra, &seq).unwrap();

    let index = seq.modify_byte(3000, b'Q').unwrap();
    assert_eq!(index, 2);
    ripple::update(&algebra, &seq, &mut table, index).unwrap();

    let mut modified = data.clone();
    modified[3000] = b'Q';
    assert_eq!(table.total(), Some(algebra.checksum(&modified)));
    table.verify(&algebra, &seq).unwrap();
}

#[test]
fn long_sequence_has_no_depth_limit() {
    let algebra = Crc32::new();
    let mut seq = BlockSequence::new((0..20_000u32).map(|i| i.to_le_bytes().to_vec()));
    let mut table = ChecksumTable::rebuild(&algebra, &seq).unwrap();

    seq.replace(0, b"head".to_vec()).unwrap();
    ripple::update(&algebra, &seq, &mut table, 0).unwrap();
    table.verify(&algebra, &seq).unwrap();
}

fn sequence_and_edit() -> impl Strategy<Value = (Vec<Vec<u8>>, usize, Vec<u8>)> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..=64), 1..=12).prop_flat_map(
        |blocks| {
            let count = blocks.len();
            (
                Just(blocks),
                0..count,
                proptest::collection::vec(any::<u8>(), 0..=64),
            )
        },
    )
}

proptest! {
    /// Ripple and Naive produce exactly the rebuilt table.
    #[test]
    fn strategies_match_rebuild((blocks, index, content) in sequence_and_edit()) {
        let algebra = Crc32::new();
        for kind in [StrategyKind::Ripple, StrategyKind::Naive] {
            let mut seq = BlockSequence::new(blocks.clone());
            let (_, after) = replace_and_update(kind, &mut seq, index, content.clone());
            let expected = ChecksumTable::rebuild(&algebra, &seq).unwrap();
            prop_assert_eq!(&after, &expected, "{} diverged at index {}", kind, index);
        }
    }

    /// Entries before the replaced index are bit-identical afterwards.
    #[test]
    fn strategies_leave_prefix_untouched((blocks, index, content) in sequence_and_edit()) {
        for kind in StrategyKind::ALL {
            let mut seq = BlockSequence::new(blocks.clone());
            let (before, after) = replace_and_update(kind, &mut seq, index, content.clone());
            prop_assert_eq!(&before.entries()[..index], &after.entries()[..index]);
        }
    }

    /// Ripple reads content for the replaced index and nothing else.
    #[test]
    fn ripple_reads_one_block((blocks, index, content) in sequence_and_edit()) {
        let algebra = Crc32::new();
        let mut seq = BlockSequence::new(blocks);
        let mut table = ChecksumTable::rebuild(&algebra, &seq).unwrap();
        seq.replace(index, content).unwrap();

        let counting = CountingSource::new(&seq);
        ripple::update(&algebra, &counting, &mut table, index).unwrap();
        prop_assert_eq!(counting.indices_read(), vec![index]);
    }
}
