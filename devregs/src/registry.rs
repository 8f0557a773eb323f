//! content-addressed tables for fields, registers and field sets
//!
//! every table is append-only. `resolve` returns the handle of an existing
//! equal entry (and bumps the table's duplicate counter) or stores the
//! candidate and returns its new handle.
use crate::line::{FieldDecl, RegisterDecl};
use crate::types::{Field, FieldId, FieldSet, FieldSetId, Register, RegisterId};
use std::collections::HashMap;
use thiserror::Error;

/// fields, bucketed by name
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: Vec<Field>,
    by_name: HashMap<String, Vec<FieldId>>,
    duplicates: usize,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, decl: FieldDecl) -> FieldId {
        let bucket = self.by_name.entry(decl.name.clone()).or_default();

        for &id in bucket.iter() {
            let existing = &self.fields[id.0];
            if existing.start == decl.start && existing.stop == decl.stop {
                log::trace!("field {} already registered as {:?}", existing, id);
                self.duplicates += 1;
                return id;
            }
        }

        let id = FieldId(self.fields.len());
        bucket.push(id);
        self.fields.push(Field {
            name: decl.name,
            start: decl.start,
            stop: decl.stop,
        });
        log::trace!("registered field {} as {:?}", self.fields[id.0], id);
        id
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.0)
    }

    pub fn get_by_name(&self, name: &str) -> Vec<&Field> {
        self.by_name
            .get(name)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &Field)> {
        self.fields.iter().enumerate().map(|(i, f)| (FieldId(i), f))
    }

    /// number of distinct field names
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no register with handle {0:?}")]
pub struct AttachError(pub RegisterId);

/// registers, bucketed by address. the address is the primary key, the name
/// tells apart registers aliased at one address.
#[derive(Debug, Clone, Default)]
pub struct RegisterTable {
    registers: Vec<Register>,
    by_address: HashMap<String, Vec<RegisterId>>,
    /// addresses in first-seen order
    addresses: Vec<String>,
    duplicates: usize,
}

impl RegisterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, decl: RegisterDecl) -> RegisterId {
        if let Some(bucket) = self.by_address.get(&decl.address) {
            for &id in bucket {
                if self.registers[id.0].name == decl.name {
                    log::debug!("matched register {}:{}", decl.address, decl.name);
                    self.duplicates += 1;
                    return id;
                }
            }
        } else {
            self.addresses.push(decl.address.clone());
        }

        let id = RegisterId(self.registers.len());
        self.by_address
            .entry(decl.address.clone())
            .or_default()
            .push(id);
        log::trace!("registered register {}:{} as {:?}", decl.address, decl.name, id);
        self.registers.push(Register {
            name: decl.name,
            address: decl.address,
            width: decl.width,
            field_set: None,
        });
        id
    }

    /// attach a field set to a register, returning the one it replaced
    pub fn attach(
        &mut self,
        id: RegisterId,
        field_set: FieldSetId,
    ) -> Result<Option<FieldSetId>, AttachError> {
        let register = self.registers.get_mut(id.0).ok_or(AttachError(id))?;
        Ok(register.field_set.replace(field_set))
    }

    pub fn get(&self, id: RegisterId) -> Option<&Register> {
        self.registers.get(id.0)
    }

    pub fn get_by_address(&self, address: &str) -> Vec<&Register> {
        self.by_address
            .get(address)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    /// registers grouped by address, both in first-seen order
    pub fn by_address(&self) -> impl Iterator<Item = (&str, Vec<&Register>)> {
        self.addresses
            .iter()
            .map(|address| (address.as_str(), self.get_by_address(address)))
    }

    pub fn address_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

/// computes the bucketing hash of a field set's contents
pub type FieldSetHasher = fn(&[&Field]) -> u64;

/// sum of the CRC32 of every serialized field attribute.
///
/// addition commutes, so the hash does not depend on field order. different
/// sets can share a hash (e.g. swapping bit numbers between two fields), so
/// it only selects a bucket.
pub fn field_set_hash(fields: &[&Field]) -> u64 {
    fields.iter().fold(0u64, |sum, field| {
        sum.wrapping_add(attribute_checksum(&field.name))
            .wrapping_add(attribute_checksum(&field.start))
            .wrapping_add(attribute_checksum(&field.stop))
    })
}

fn attribute_checksum<T: serde::Serialize + ?Sized>(value: &T) -> u64 {
    use bincode::Options;

    let bytes = bincode::DefaultOptions::new()
        .with_fixint_encoding() // Ensure consistent integer encoding
        .serialize(value)
        .expect("serialization cannot fail");

    u64::from(crc32fast::hash(&bytes))
}

/// field sets, bucketed by content hash
#[derive(Debug, Clone)]
pub struct FieldSetTable {
    sets: Vec<FieldSet>,
    by_hash: HashMap<u64, Vec<FieldSetId>>,
    duplicates: usize,
    hasher: FieldSetHasher,
}

impl FieldSetTable {
    pub fn new() -> Self {
        Self::with_hasher(field_set_hash)
    }

    pub fn with_hasher(hasher: FieldSetHasher) -> Self {
        Self {
            sets: Vec::new(),
            by_hash: HashMap::new(),
            duplicates: 0,
            hasher,
        }
    }

    /// resolve the fields declared for one register. `fields` must not be
    /// empty and every handle must come from `field_table`.
    pub fn resolve(&mut self, fields: Vec<FieldId>, field_table: &FieldTable) -> FieldSetId {
        let values = Self::field_values(&fields, field_table);
        let hash = (self.hasher)(&values);

        let bucket = self.by_hash.entry(hash).or_default();
        for &id in bucket.iter() {
            let existing = &self.sets[id.0];
            let existing_values = Self::field_values(&existing.fields, field_table);
            if same_fields(&values, &existing_values) {
                log::trace!("field set with hash {:016x} matched {}", hash, id);
                self.duplicates += 1;
                self.sets[id.0].usage += 1;
                return id;
            }
            log::debug!("field set hash {:016x} collides with {}", hash, id);
        }

        let id = FieldSetId(self.sets.len());
        bucket.push(id);
        log::trace!("registered field set {} with hash {:016x}", id, hash);
        self.sets.push(FieldSet {
            fields,
            hash,
            usage: 1,
        });
        id
    }

    fn field_values<'a>(ids: &[FieldId], field_table: &'a FieldTable) -> Vec<&'a Field> {
        ids.iter().filter_map(|id| field_table.get(*id)).collect()
    }

    pub fn get(&self, id: FieldSetId) -> Option<&FieldSet> {
        self.sets.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldSetId, &FieldSet)> {
        self.sets.iter().enumerate().map(|(i, s)| (FieldSetId(i), s))
    }

    /// number of distinct content hashes
    pub fn hash_count(&self) -> usize {
        self.by_hash.len()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Default for FieldSetTable {
    fn default() -> Self {
        Self::new()
    }
}

/// multiset equality, ignoring order
fn same_fields(a: &[&Field], b: &[&Field]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}
