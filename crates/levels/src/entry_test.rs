//! Activation engine tests
//!
//! Mask algebra literals, entry precedence and tag matching.

use crate::{LevelMask, LevelRegistry, Pattern, WriterEntry, WriterEntrySet};

fn registry_with_aspect() -> LevelRegistry {
    let registry = LevelRegistry::new();
    registry.register_aspect("Aspect").unwrap();
    registry
}

fn single_entry_mask(entry: WriterEntry, registry: &LevelRegistry) -> LevelMask {
    let mut set = WriterEntrySet::new();
    set.push(entry.default_entry()).unwrap();
    set.mask_for("AnyWriter", &[], registry)
}

// ============================================================================
// Mask Algebra
// ============================================================================

#[test]
fn test_base_none_is_all_zero() {
    let registry = LevelRegistry::new();
    let mask = single_entry_mask(WriterEntry::new("None"), &registry);
    assert_eq!(mask.bits(), 0x0000_0000);
}

#[test]
fn test_base_all_sets_every_bit() {
    let registry = LevelRegistry::new();
    let mask = single_entry_mask(WriterEntry::new("All"), &registry);
    assert_eq!(mask.bits(), 0xFFFF_FFFF);
}

#[test]
fn test_base_notice_alone() {
    let registry = LevelRegistry::new();
    let mask = single_entry_mask(WriterEntry::new("Notice"), &registry);
    assert_eq!(mask.bits(), 0x0000_003F);
}

#[test]
fn test_base_all_exclude_notice() {
    let registry = LevelRegistry::new();
    let mask = single_entry_mask(WriterEntry::new("All").exclude("Notice"), &registry);
    assert_eq!(mask.bits(), 0xFFFF_FFDF);
}

#[test]
fn test_base_debug_include_exclude_combination() {
    // Exclude overrides include for the same bit (Error), Trace is already
    // inside the Debug threshold, Aspect adds bit 13.
    let registry = registry_with_aspect();
    let entry = WriterEntry::new("Debug")
        .include("Error")
        .include("Trace")
        .include("Aspect")
        .exclude("Error");
    let mask = single_entry_mask(entry, &registry);
    assert_eq!(mask.bits(), 0x0000_21F7);
}

#[test]
fn test_include_enables_noncontiguous_level() {
    let registry = registry_with_aspect();
    let mask = single_entry_mask(WriterEntry::new("None").include("Aspect"), &registry);
    assert_eq!(mask.bits(), 0x0000_2000);
}

#[test]
fn test_unknown_include_is_skipped() {
    let registry = LevelRegistry::new();
    let mask = single_entry_mask(
        WriterEntry::new("Notice").include("NoSuchLevel"),
        &registry,
    );
    assert_eq!(mask.bits(), 0x0000_003F);
}

#[test]
fn test_unknown_base_silences_writer() {
    let registry = LevelRegistry::new();
    let mask = single_entry_mask(WriterEntry::new("NoSuchLevel"), &registry);
    assert!(mask.is_empty());
}

// ============================================================================
// Entry Precedence
// ============================================================================

#[test]
fn test_first_structural_match_beats_default() {
    let registry = LevelRegistry::new();
    let mut set = WriterEntrySet::new();
    set.push(
        WriterEntry::new("Debug").name_pattern(Pattern::wildcard("Foo*").unwrap()),
    )
    .unwrap();
    set.push(
        WriterEntry::new("Notice")
            .name_pattern(Pattern::wildcard("*").unwrap())
            .default_entry(),
    )
    .unwrap();

    // "FooBar" resolves via the first entry
    let mask = set.mask_for("FooBar", &[], &registry);
    assert_eq!(mask.bits(), 0x0000_01FF);

    // "Baz" falls through to the default
    let mask = set.mask_for("Baz", &[], &registry);
    assert_eq!(mask.bits(), 0x0000_003F);
}

#[test]
fn test_insertion_order_wins_among_matches() {
    let registry = LevelRegistry::new();
    let mut set = WriterEntrySet::new();
    set.push(WriterEntry::new("Error").name_pattern(Pattern::wildcard("App*").unwrap()))
        .unwrap();
    set.push(WriterEntry::new("Debug").name_pattern(Pattern::wildcard("AppServer").unwrap()))
        .unwrap();

    // Both match "AppServer"; the earlier entry governs
    let mask = set.mask_for("AppServer", &[], &registry);
    assert_eq!(mask.bits(), LevelMask::up_to(crate::predefined::ERROR).bits());
}

#[test]
fn test_no_match_and_no_default_silences() {
    let registry = LevelRegistry::new();
    let mut set = WriterEntrySet::new();
    set.push(WriterEntry::new("All").name_pattern(Pattern::exact("Only")))
        .unwrap();

    assert!(set.mask_for("Other", &[], &registry).is_empty());
}

#[test]
fn test_duplicate_default_rejected() {
    let mut set = WriterEntrySet::new();
    set.push(WriterEntry::new("All").default_entry()).unwrap();
    let err = set.push(WriterEntry::new("None").default_entry()).unwrap_err();
    assert!(matches!(err, crate::LevelError::DuplicateDefault));
    assert_eq!(set.len(), 1);
}

// ============================================================================
// Tag Matching
// ============================================================================

#[test]
fn test_tag_patterns_require_one_matching_tag() {
    let registry = LevelRegistry::new();
    let mut set = WriterEntrySet::new();
    set.push(
        WriterEntry::new("Debug")
            .name_pattern(Pattern::wildcard("*").unwrap())
            .tag_pattern(Pattern::exact("net")),
    )
    .unwrap();
    set.push(
        WriterEntry::new("Notice")
            .name_pattern(Pattern::wildcard("*").unwrap())
            .default_entry(),
    )
    .unwrap();

    let tagged = vec!["net".to_string(), "io".to_string()];
    assert_eq!(set.mask_for("W", &tagged, &registry).bits(), 0x0000_01FF);

    let untagged = vec!["db".to_string()];
    assert_eq!(set.mask_for("W", &untagged, &registry).bits(), 0x0000_003F);
}

#[test]
fn test_entry_without_name_patterns_matches_any_name() {
    let registry = LevelRegistry::new();
    let mut set = WriterEntrySet::new();
    set.push(WriterEntry::new("Warning").tag_pattern(Pattern::exact("audit")))
        .unwrap();

    let tags = vec!["audit".to_string()];
    assert_eq!(set.mask_for("Anything", &tags, &registry).bits(), 0x0000_001F);
    assert!(set.mask_for("Anything", &[], &registry).is_empty());
}
