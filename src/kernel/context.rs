//! FormalContext: a bit-packed binary relation.
//!
//! A formal context K = (G, M, I) is a set of objects G, a set of attributes
//! M and an incidence relation I between them ("object g has attribute m").
//! Rows and columns are both stored as packed `u64` words, so each derivation
//! is a word-wise AND over the selected rows or columns.
//!
//! # Example
//!
//! ```rust
//! use concept_lattice::FormalContext;
//!
//! let ctx = FormalContext::new(vec![
//!     vec![true, true, false],
//!     vec![true, false, true],
//! ])?
//! .with_object_names(["owl", "duck"])?
//! .with_attribute_names(["fly", "hunt", "swim"])?;
//!
//! assert_eq!(ctx.extension(&["fly"])?, vec!["owl", "duck"]);
//! assert_eq!(ctx.intention(&["owl"])?, vec!["fly", "hunt"]);
//! # Ok::<(), concept_lattice::LatticeError>(())
//! ```

use sha2::{Digest, Sha256};
use std::fmt;

use super::relation::{Axis, Relation, RelationHash};
use crate::error::{LatticeError, Result};

const WORD: usize = 64;

/// Fixed-length packed bit row.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Bits {
    words: Vec<u64>,
    len: usize,
}

impl Bits {
    fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD)],
            len,
        }
    }

    fn ones(len: usize) -> Self {
        let mut bits = Self {
            words: vec![u64::MAX; len.div_ceil(WORD)],
            len,
        };
        let tail = len % WORD;
        if tail != 0 {
            if let Some(last) = bits.words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        bits
    }

    fn set(&mut self, i: usize) {
        self.words[i / WORD] |= 1u64 << (i % WORD);
    }

    fn get(&self, i: usize) -> bool {
        self.words[i / WORD] & (1u64 << (i % WORD)) != 0
    }

    fn and_assign(&mut self, other: &Bits) {
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w &= o;
        }
    }

    fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of set bits, ascending.
    fn indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.count_ones());
        for (wi, &word) in self.words.iter().enumerate() {
            let mut w = word;
            while w != 0 {
                let bit = w.trailing_zeros() as usize;
                out.push(wi * WORD + bit);
                w &= w - 1;
            }
        }
        out
    }
}

/// A binary object x attribute relation with names.
///
/// Immutable once constructed; the content hash is computed once.
#[derive(Clone, Debug)]
pub struct FormalContext {
    n_objects: usize,
    n_attributes: usize,
    /// One packed row per object, over attributes
    rows: Vec<Bits>,
    /// One packed column per attribute, over objects
    columns: Vec<Bits>,
    object_names: Vec<String>,
    attribute_names: Vec<String>,
    hash: RelationHash,
}

impl FormalContext {
    /// Build a context from boolean rows, one per object.
    ///
    /// Objects and attributes get default names `"0"`, `"1"`, ...
    /// Every row must have the same length.
    pub fn new(rows: Vec<Vec<bool>>) -> Result<Self> {
        let width = rows.first().map_or(0, |r| r.len());
        Self::with_width(rows, width)
    }

    /// Build a context whose attribute count is given explicitly, so that a
    /// context without objects can still have attributes.
    pub fn with_width(rows: Vec<Vec<bool>>, n_attributes: usize) -> Result<Self> {
        for row in &rows {
            if row.len() != n_attributes {
                return Err(LatticeError::DimensionMismatch {
                    expected: n_attributes,
                    got: row.len(),
                });
            }
        }
        let object_names = (0..rows.len()).map(|i| i.to_string()).collect();
        let attribute_names = (0..n_attributes).map(|i| i.to_string()).collect();
        Ok(Self::assemble(&rows, n_attributes, object_names, attribute_names))
    }

    /// Replace object names. The number of names must match the object count.
    pub fn with_object_names<I, S>(self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != self.n_objects {
            return Err(LatticeError::DimensionMismatch {
                expected: self.n_objects,
                got: names.len(),
            });
        }
        let rows = self.to_rows();
        Ok(Self::assemble(&rows, self.n_attributes, names, self.attribute_names))
    }

    /// Replace attribute names. The number of names must match the attribute count.
    pub fn with_attribute_names<I, S>(self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != self.n_attributes {
            return Err(LatticeError::DimensionMismatch {
                expected: self.n_attributes,
                got: names.len(),
            });
        }
        let rows = self.to_rows();
        Ok(Self::assemble(&rows, self.n_attributes, self.object_names, names))
    }

    fn assemble(
        rows: &[Vec<bool>],
        n_attributes: usize,
        object_names: Vec<String>,
        attribute_names: Vec<String>,
    ) -> Self {
        let n_objects = rows.len();
        let mut packed_rows = vec![Bits::zeros(n_attributes); n_objects];
        let mut columns = vec![Bits::zeros(n_objects); n_attributes];
        for (g, row) in rows.iter().enumerate() {
            for (m, &cell) in row.iter().enumerate() {
                if cell {
                    packed_rows[g].set(m);
                    columns[m].set(g);
                }
            }
        }

        let hash = content_digest(&packed_rows, n_attributes, &object_names, &attribute_names);
        Self {
            n_objects,
            n_attributes,
            rows: packed_rows,
            columns,
            object_names,
            attribute_names,
            hash,
        }
    }

    /// Does object `g` have attribute `m`?
    pub fn incidence(&self, g: usize, m: usize) -> bool {
        self.rows[g].get(m)
    }

    /// Number of true cells.
    pub fn connections(&self) -> usize {
        self.rows.iter().map(Bits::count_ones).sum()
    }

    pub fn object_names(&self) -> &[String] {
        &self.object_names
    }

    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    /// Unpack into boolean rows.
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.rows
            .iter()
            .map(|row| (0..self.n_attributes).map(|m| row.get(m)).collect())
            .collect()
    }

    /// Names of all objects sharing the named attributes.
    pub fn extension(&self, attributes: &[&str]) -> Result<Vec<String>> {
        let indices = lookup(&self.attribute_names, attributes, "attribute")?;
        Ok(self
            .objects_sharing(&indices)
            .into_iter()
            .map(|g| self.object_names[g].clone())
            .collect())
    }

    /// Names of all attributes shared by the named objects.
    pub fn intention(&self, objects: &[&str]) -> Result<Vec<String>> {
        let indices = lookup(&self.object_names, objects, "object")?;
        Ok(self
            .attributes_shared_by(&indices)
            .into_iter()
            .map(|m| self.attribute_names[m].clone())
            .collect())
    }

    /// Render as a table, eliding the middle of large contexts.
    pub fn print_data(&self, max_objects: usize, max_attributes: usize) -> String {
        // None marks the elision column
        let columns: Vec<Option<usize>> = if self.n_attributes > max_attributes {
            let half = max_attributes / 2;
            (0..half)
                .map(Some)
                .chain(std::iter::once(None))
                .chain((self.n_attributes - half..self.n_attributes).map(Some))
                .collect()
        } else {
            (0..self.n_attributes).map(Some).collect()
        };
        let (objects, elide_rows): (Vec<usize>, bool) = if self.n_objects > max_objects {
            let half = max_objects / 2;
            (
                (0..half).chain(self.n_objects - half..self.n_objects).collect(),
                true,
            )
        } else {
            ((0..self.n_objects).collect(), false)
        };

        let column_label = |c: &Option<usize>| match c {
            Some(m) => self.attribute_names[*m].as_str(),
            None => "...",
        };
        let name_width = objects
            .iter()
            .map(|&g| self.object_names[g].chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::with_capacity(objects.len() + 3);
        let header: Vec<&str> = columns.iter().map(column_label).collect();
        lines.push(format!("{}|{}|", " ".repeat(name_width), header.join("|")));

        for (pos, &g) in objects.iter().enumerate() {
            if elide_rows && pos == max_objects / 2 {
                let width = name_width
                    + 1
                    + columns
                        .iter()
                        .map(|c| column_label(c).chars().count() + 1)
                        .sum::<usize>();
                lines.push(".".repeat(width));
                lines.push(".".repeat(width));
            }
            let name = &self.object_names[g];
            let cells: Vec<String> = columns
                .iter()
                .map(|c| match c {
                    Some(m) => {
                        let pad = self.attribute_names[*m].chars().count().saturating_sub(1);
                        let mark = if self.rows[g].get(*m) { "X" } else { " " };
                        format!("{}{}", " ".repeat(pad), mark)
                    }
                    None => "...".to_string(),
                })
                .collect();
            lines.push(format!(
                "{}{}|{}|",
                name,
                " ".repeat(name_width - name.chars().count()),
                cells.join("|")
            ));
        }
        lines.join("\n")
    }
}

impl Relation for FormalContext {
    fn object_count(&self) -> usize {
        self.n_objects
    }

    fn attribute_count(&self) -> usize {
        self.n_attributes
    }

    fn object_name(&self, object: usize) -> &str {
        &self.object_names[object]
    }

    fn attribute_name(&self, attribute: usize) -> &str {
        &self.attribute_names[attribute]
    }

    fn objects_sharing(&self, attributes: &[usize]) -> Vec<usize> {
        let mut acc = Bits::ones(self.n_objects);
        for &m in attributes {
            acc.and_assign(&self.columns[m]);
        }
        acc.indices()
    }

    fn attributes_shared_by(&self, objects: &[usize]) -> Vec<usize> {
        let mut acc = Bits::ones(self.n_attributes);
        for &g in objects {
            acc.and_assign(&self.rows[g]);
        }
        acc.indices()
    }

    fn content_hash(&self) -> RelationHash {
        self.hash
    }

    fn project(&self, indices: &[usize], axis: Axis) -> Result<Self> {
        let len = self.count(axis);
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(LatticeError::IndexOutOfRange { index, len });
        }

        let rows = self.to_rows();
        match axis {
            Axis::Objects => {
                let picked: Vec<Vec<bool>> = indices.iter().map(|&g| rows[g].clone()).collect();
                let names = indices.iter().map(|&g| self.object_names[g].clone()).collect();
                Ok(Self::assemble(
                    &picked,
                    self.n_attributes,
                    names,
                    self.attribute_names.clone(),
                ))
            }
            Axis::Attributes => {
                let picked: Vec<Vec<bool>> = rows
                    .iter()
                    .map(|row| indices.iter().map(|&m| row[m]).collect())
                    .collect();
                let names = indices.iter().map(|&m| self.attribute_names[m].clone()).collect();
                Ok(Self::assemble(
                    &picked,
                    indices.len(),
                    self.object_names.clone(),
                    names,
                ))
            }
        }
    }
}

impl PartialEq for FormalContext {
    fn eq(&self, other: &Self) -> bool {
        self.n_attributes == other.n_attributes
            && self.object_names == other.object_names
            && self.attribute_names == other.attribute_names
            && self.rows == other.rows
    }
}

impl Eq for FormalContext {}

impl fmt::Display for FormalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "FormalContext ({} objects, {} attributes, {} connections)",
            self.n_objects,
            self.n_attributes,
            self.connections()
        )?;
        write!(f, "{}", self.print_data(20, 10))
    }
}

fn lookup(names: &[String], wanted: &[&str], what: &str) -> Result<Vec<usize>> {
    let mut indices = wanted
        .iter()
        .map(|w| {
            names
                .iter()
                .position(|n| n == w)
                .ok_or_else(|| LatticeError::UnknownName(format!("{} \"{}\"", what, w)))
        })
        .collect::<Result<Vec<usize>>>()?;
    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}

/// SHA-256 over shape, names and packed rows; the first 8 bytes become the hash.
fn content_digest(
    rows: &[Bits],
    n_attributes: usize,
    object_names: &[String],
    attribute_names: &[String],
) -> RelationHash {
    let mut hasher = Sha256::new();
    hasher.update((rows.len() as u64).to_le_bytes());
    hasher.update((n_attributes as u64).to_le_bytes());
    for name in object_names.iter().chain(attribute_names.iter()) {
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
    }
    for row in rows {
        for word in &row.words {
            hasher.update(word.to_le_bytes());
        }
    }
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[0..8]);
    RelationHash(u64::from_le_bytes(head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_data::animal_movement;

    #[test]
    fn test_ragged_rows_rejected() {
        let err = FormalContext::new(vec![vec![true], vec![true, false]]).unwrap_err();
        assert!(matches!(
            err,
            LatticeError::DimensionMismatch { expected: 1, got: 2 }
        ));
    }

    #[test]
    fn test_name_count_checked() {
        let ctx = FormalContext::new(vec![vec![true, false]]).unwrap();
        assert!(ctx.clone().with_object_names(["a", "b"]).is_err());
        assert!(ctx.with_attribute_names(["x"]).is_err());
    }

    #[test]
    fn test_default_names() {
        let ctx = FormalContext::new(vec![vec![true, false], vec![false, false]]).unwrap();
        assert_eq!(ctx.object_names(), &["0".to_string(), "1".to_string()]);
        assert_eq!(ctx.attribute_name(1), "1");
    }

    #[test]
    fn test_index_derivations() {
        let ctx = animal_movement();
        assert_eq!(ctx.objects_sharing(&[0, 1]), vec![4, 5, 6]);
        assert_eq!(ctx.attributes_shared_by(&[4, 5, 6]), vec![0, 1]);
        // empty sets derive to the whole dual side
        assert_eq!(ctx.objects_sharing(&[]).len(), ctx.object_count());
        assert_eq!(ctx.attributes_shared_by(&[]).len(), ctx.attribute_count());
    }

    #[test]
    fn test_name_derivations() {
        let ctx = animal_movement();
        assert_eq!(
            ctx.extension(&["fly", "hunt"]).unwrap(),
            vec!["owl", "hawk", "eagle"]
        );
        let intent = ctx.intention(&["owl", "hawk", "eagle"]).unwrap();
        assert_eq!(intent, vec!["fly", "hunt"]);

        let intent_refs: Vec<&str> = intent.iter().map(String::as_str).collect();
        let extent = ctx.extension(&intent_refs).unwrap();
        let extent_refs: Vec<&str> = extent.iter().map(String::as_str).collect();
        assert_eq!(ctx.intention(&extent_refs).unwrap(), intent);

        assert!(matches!(
            ctx.intention(&["d1"]),
            Err(LatticeError::UnknownName(_))
        ));
        assert!(ctx.extension(&["z93"]).is_err());
    }

    #[test]
    fn test_packing_across_word_boundary() {
        let rows: Vec<Vec<bool>> = (0..130).map(|g| vec![g % 2 == 0, g >= 64]).collect();
        let ctx = FormalContext::new(rows).unwrap();
        let both = ctx.objects_sharing(&[0, 1]);
        assert_eq!(both.first(), Some(&64));
        assert_eq!(both.last(), Some(&128));
        assert_eq!(both.len(), 33);
        assert_eq!(ctx.objects_sharing(&[]).len(), 130);
    }

    #[test]
    fn test_hash_tracks_content() {
        let a = animal_movement();
        let b = animal_movement();
        assert_eq!(a.content_hash(), b.content_hash());

        let mut rows = a.to_rows();
        rows[0][0] = !rows[0][0];
        let c = FormalContext::new(rows).unwrap();
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn test_project_attributes_reorders() {
        let ctx = animal_movement();
        let proj = ctx.project(&[1, 0], Axis::Attributes).unwrap();
        assert_eq!(proj.attribute_count(), 2);
        assert_eq!(proj.attribute_name(0), "hunt");
        assert_eq!(proj.objects_sharing(&[0]), ctx.objects_sharing(&[1]));
        assert_ne!(proj.content_hash(), ctx.content_hash());
    }

    #[test]
    fn test_project_objects_and_identity() {
        let ctx = animal_movement();
        let proj = ctx.project(&[4, 5], Axis::Objects).unwrap();
        assert_eq!(proj.object_count(), 2);
        assert_eq!(proj.object_name(1), "hawk");
        assert_eq!(proj.attributes_shared_by(&[0, 1]), vec![0, 1]);
        assert_eq!(proj.attributes_shared_by(&[]), vec![0, 1, 2, 3]);

        let all: Vec<usize> = (0..ctx.attribute_count()).collect();
        let same = ctx.project(&all, Axis::Attributes).unwrap();
        assert_eq!(same, ctx);
        assert_eq!(same.content_hash(), ctx.content_hash());

        let none = ctx.project(&[], Axis::Objects).unwrap();
        assert_eq!(none.object_count(), 0);
        assert_eq!(none.attribute_count(), 4);
    }

    #[test]
    fn test_project_out_of_range() {
        let ctx = animal_movement();
        assert!(matches!(
            ctx.project(&[9], Axis::Attributes),
            Err(LatticeError::IndexOutOfRange { index: 9, len: 4 })
        ));
    }

    #[test]
    fn test_print_data_small() {
        let ctx = FormalContext::new(vec![vec![true, false], vec![false, true]])
            .unwrap()
            .with_object_names(["ab", "c"])
            .unwrap()
            .with_attribute_names(["xy", "z"])
            .unwrap();
        assert_eq!(ctx.print_data(20, 10), "  |xy|z|\nab| X| |\nc |  |X|");
        assert_eq!(ctx.connections(), 2);
    }

    #[test]
    fn test_print_data_elides() {
        let ctx = animal_movement();
        let printed = ctx.print_data(4, 2);
        let lines: Vec<&str> = printed.lines().collect();
        // header + 2 top rows + 2 dotted lines + 2 bottom rows
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "     |fly|...|swim|");
        assert!(lines[3].chars().all(|c| c == '.'));
        assert!(lines[6].starts_with("eagle|"));
    }
}
