//! Position classifiers.
//!
//! A classifier partitions `0..len` into disjoint classes, each of which gets
//! its own wheel. Classifiers are strategy objects: the solver only ever sees
//! `&dyn Classifier`, so alternate formulas can be swapped in for
//! falsification without touching any downstream code.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Total, deterministic map from position to class.
pub trait Classifier: Send + Sync {
    /// Class of `position`, always `< self.num_classes()`.
    fn classify(&self, position: usize) -> usize;

    /// Number of classes the formula can produce.
    fn num_classes(&self) -> usize;

    /// Stable name recorded in wheel sets and skeletons.
    fn name(&self) -> String;
}

/// Data-described classifier formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifierFormula {
    /// `(position mod outer) * inner + (position mod inner)`.
    Product {
        /// Outer modulus.
        outer: usize,
        /// Inner modulus.
        inner: usize,
    },
    /// `position mod modulus`.
    Modulo {
        /// Modulus.
        modulus: usize,
    },
    /// `(position / width) mod modulus`: runs of `width` adjacent positions.
    Block {
        /// Run length.
        width: usize,
        /// Modulus.
        modulus: usize,
    },
}

impl ClassifierFormula {
    /// `((position mod 2) * 3) + (position mod 3)`: six classes.
    pub const REFERENCE: ClassifierFormula = ClassifierFormula::Product { outer: 2, inner: 3 };

    /// The reference formula.
    pub fn reference() -> Self {
        Self::REFERENCE
    }

    /// Standard falsification sweep of 24 formulas, reference included.
    ///
    /// Six products over distinct moduli in `{2, 3, 4}`, eight plain moduli in
    /// `2..=9`, and ten block formulas.
    pub fn sweep() -> Vec<Self> {
        let mut formulas = Vec::with_capacity(24);
        for (outer, inner) in [(2, 3), (3, 2), (2, 4), (4, 2), (3, 4), (4, 3)] {
            formulas.push(Self::Product { outer, inner });
        }
        for modulus in 2..=9 {
            formulas.push(Self::Modulo { modulus });
        }
        for width in 2..=6 {
            for modulus in [2, 3] {
                formulas.push(Self::Block { width, modulus });
            }
        }
        formulas
    }
}

impl Classifier for ClassifierFormula {
    fn classify(&self, position: usize) -> usize {
        match *self {
            Self::Product { outer, inner } => (position % outer) * inner + position % inner,
            Self::Modulo { modulus } => position % modulus,
            Self::Block { width, modulus } => (position / width) % modulus,
        }
    }

    fn num_classes(&self) -> usize {
        match *self {
            Self::Product { outer, inner } => outer * inner,
            Self::Modulo { modulus } | Self::Block { modulus, .. } => modulus,
        }
    }

    fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClassifierFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Product { outer, inner } => write!(f, "product({outer},{inner})"),
            Self::Modulo { modulus } => write!(f, "mod({modulus})"),
            Self::Block { width, modulus } => write!(f, "block({width},{modulus})"),
        }
    }
}

/// Positions of `0..len` grouped by class, ascending within each class.
pub fn partition(classifier: &dyn Classifier, len: usize) -> Result<Vec<Vec<usize>>> {
    let classes = classifier.num_classes();
    let mut groups = vec![Vec::new(); classes];
    for position in 0..len {
        let class = classifier.classify(position);
        if class >= classes {
            return Err(Error::ClassOutOfRange {
                position,
                class,
                classes,
            });
        }
        groups[class].push(position);
    }
    Ok(groups)
}
