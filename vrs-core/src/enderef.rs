//! Reversible transforms between inlined and referenced object graphs.
//!
//! `enref` walks an object tree depth-first post-order: children are
//! identified and stashed in the object store before the parent, so the
//! parent always digests over child references that are already in place.
//! `deref` is the inverse and fails with `UnknownReference` for any id the
//! store cannot resolve. Both return new objects; inputs are never mutated.

use crate::digest::{identify, identify_location};
use crate::errors::{Result, VrsError};
use crate::models::{LocationRef, Variation, VrsObject};
use crate::store::ObjectStore;

fn enref_location(location: &mut LocationRef, store: &mut dyn ObjectStore) -> Result<()> {
    if let LocationRef::Inlined(loc) = location {
        let id = identify_location(loc)?;
        store.put(id.clone(), VrsObject::SequenceLocation((**loc).clone()));
        *location = LocationRef::Referenced(id);
    }
    Ok(())
}

/// Convert a variation to referenced form, stashing every identifiable
/// sub-object (and the object itself) in the store. Returns the referenced
/// form; the input is untouched.
pub fn enref(v: &Variation, store: &mut dyn ObjectStore) -> Result<Variation> {
    let mut out = v.clone();
    match &mut out {
        Variation::Allele(a) => enref_location(&mut a.location, store)?,
        Variation::CopyNumberCount(c) => enref_location(&mut c.location, store)?,
        Variation::CopyNumberChange(c) => enref_location(&mut c.location, store)?,
    }
    let id = identify(&mut out)?;
    store.put(id, out.clone().into());
    Ok(out)
}

fn deref_location(location: &mut LocationRef, store: &dyn ObjectStore) -> Result<()> {
    if let LocationRef::Referenced(id) = location {
        let obj = store
            .get(id)
            .ok_or_else(|| VrsError::UnknownReference(id.clone()))?;
        match obj {
            VrsObject::SequenceLocation(loc) => {
                *location = LocationRef::inlined(loc.clone());
            }
            other => {
                return Err(VrsError::InvalidInput(format!(
                    "location reference {id} resolves to a {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(())
}

/// Convert a variation back to inlined form by resolving every reference
/// through the store. Returns the inlined form; the input is untouched.
pub fn deref(v: &Variation, store: &dyn ObjectStore) -> Result<Variation> {
    let mut out = v.clone();
    match &mut out {
        Variation::Allele(a) => deref_location(&mut a.location, store)?,
        Variation::CopyNumberCount(c) => deref_location(&mut c.location, store)?,
        Variation::CopyNumberChange(c) => deref_location(&mut c.location, store)?,
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::allele_identifier;
    use crate::models::{
        Allele, CopyChange, CopyNumberChange, SequenceExpression, SequenceLocation,
        SequenceReference,
    };
    use crate::store::MemoryObjectStore;

    fn sample_allele() -> Allele {
        Allele::new(
            SequenceLocation::new(
                SequenceReference::new("SQ.aUiQCzCPZ2d0csHbMSbh2NzInhonSXwI"),
                80656488u64,
                80656489u64,
            ),
            SequenceExpression::literal("T"),
        )
    }

    #[test]
    fn enref_replaces_location_with_identifier() {
        let mut store = MemoryObjectStore::new();
        let v = Variation::Allele(sample_allele());
        let reffed = enref(&v, &mut store).unwrap();

        let Variation::Allele(a) = &reffed else { unreachable!() };
        assert_eq!(
            a.location,
            LocationRef::Referenced("ga4gh:SL.JiLRuuyS5wefF_6-Vw7m3Yoqqb2YFkss".to_string())
        );
        // Both the allele and its location are in the store.
        assert_eq!(store.len(), 2);
        assert!(store
            .get("ga4gh:SL.JiLRuuyS5wefF_6-Vw7m3Yoqqb2YFkss")
            .is_some());
        assert!(store
            .get("ga4gh:VA.ebezGL6HoAhtGJyVnB_mE5BH18ntKev4")
            .is_some());
    }

    #[test]
    fn enref_deref_preserves_identity() {
        let mut store = MemoryObjectStore::new();
        let v = Variation::Allele(sample_allele());

        let reffed = enref(&v, &mut store).unwrap();
        let inlined = deref(&reffed, &store).unwrap();

        let Variation::Allele(original) = &v else { unreachable!() };
        let Variation::Allele(round_tripped) = &inlined else { unreachable!() };
        assert_eq!(
            allele_identifier(original).unwrap(),
            allele_identifier(round_tripped).unwrap()
        );
        assert_eq!(
            round_tripped.location.as_inlined().unwrap().refget_accession(),
            "SQ.aUiQCzCPZ2d0csHbMSbh2NzInhonSXwI"
        );
    }

    #[test]
    fn repeated_cycles_are_stable() {
        let mut store = MemoryObjectStore::new();
        let mut v = Variation::Allele(sample_allele());
        let id0 = allele_identifier(&sample_allele()).unwrap();
        for _ in 0..3 {
            let reffed = enref(&v, &mut store).unwrap();
            v = deref(&reffed, &store).unwrap();
            let Variation::Allele(a) = &v else { unreachable!() };
            assert_eq!(allele_identifier(a).unwrap(), id0);
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn deref_unknown_reference_fails() {
        let store = MemoryObjectStore::new();
        let mut a = sample_allele();
        a.location =
            LocationRef::Referenced("ga4gh:SL.JiLRuuyS5wefF_6-Vw7m3Yoqqb2YFkss".to_string());
        let err = deref(&Variation::Allele(a), &store).unwrap_err();
        assert!(matches!(err, VrsError::UnknownReference(_)));
    }

    #[test]
    fn enref_works_for_copy_number_classes() {
        let mut store = MemoryObjectStore::new();
        let cnx = CopyNumberChange::new(
            SequenceLocation::new(
                SequenceReference::new("SQ.eK4D2MosgK_ivBkgi6FVPg5UXs1bYESm"),
                45002866u64,
                45015056u64,
            ),
            CopyChange::Loss,
        );
        let reffed = enref(&Variation::CopyNumberChange(cnx), &mut store).unwrap();
        assert_eq!(
            reffed.id(),
            Some("ga4gh:CX.XQt04FoCIptvgp6GtE2qjEaUJC7cr1wo")
        );
        let restored = deref(&reffed, &store).unwrap();
        let Variation::CopyNumberChange(c) = &restored else { unreachable!() };
        assert!(c.location.as_inlined().is_some());
    }
}
