use serde::{Deserialize, Serialize};

use crate::core::linalg::{Mat4, Vec4, mat4_from_rows};
use crate::life::error::AgentError;
use crate::life::state::MusicalState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Harmonic,
    Rhythmic,
    Energetic,
    Tension,
}

impl FieldType {
    pub const ALL: [FieldType; 4] = [
        FieldType::Harmonic,
        FieldType::Rhythmic,
        FieldType::Energetic,
        FieldType::Tension,
    ];

    /// Fixed coupling weight applied to this field's contribution.
    pub const fn weight(self) -> f64 {
        match self {
            FieldType::Harmonic => 1.0,
            FieldType::Rhythmic => 0.8,
            FieldType::Energetic => 0.6,
            FieldType::Tension => 0.7,
        }
    }

    const fn slot(self) -> usize {
        match self {
            FieldType::Harmonic => 0,
            FieldType::Rhythmic => 1,
            FieldType::Energetic => 2,
            FieldType::Tension => 3,
        }
    }
}

/// A 4x4 field acting on `[pitch, time, energy, tension]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldTensor(Mat4);

impl FieldTensor {
    /// Wrap a matrix; every entry must be finite.
    pub fn new(matrix: Mat4) -> Result<Self, AgentError> {
        let bad = (0..4)
            .flat_map(|i| (0..4).map(move |j| (i, j)))
            .find(|&ij| !matrix[ij].is_finite());
        if let Some((i, j)) = bad {
            return Err(AgentError::configuration(format!(
                "field tensor entry ({i}, {j}) is not finite: {}",
                matrix[(i, j)]
            )));
        }
        Ok(Self(matrix))
    }

    /// Build a tensor from row-major rows; anything but a finite 4x4 is rejected.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, AgentError> {
        let matrix = mat4_from_rows(rows).ok_or_else(|| {
            let shape: Vec<usize> = rows.iter().map(|r| r.as_ref().len()).collect();
            AgentError::configuration(format!(
                "field tensor must be 4x4, got {} rows with lengths {shape:?}",
                rows.len()
            ))
        })?;
        Self::new(matrix)
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.0
    }

    pub fn apply(&self, v: &Vec4) -> Vec4 {
        self.0 * v
    }
}

impl TryFrom<Mat4> for FieldTensor {
    type Error = AgentError;

    fn try_from(matrix: Mat4) -> Result<Self, Self::Error> {
        Self::new(matrix)
    }
}

impl TryFrom<Vec<Vec<f64>>> for FieldTensor {
    type Error = AgentError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

/// Registered fields, at most one per [`FieldType`].
#[derive(Clone, Debug, Default)]
pub struct FieldForceModel {
    fields: [Option<FieldTensor>; 4],
}

impl FieldForceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `tensor` for `field_type`, returning the tensor it replaced.
    pub fn register(&mut self, field_type: FieldType, tensor: FieldTensor) -> Option<FieldTensor> {
        self.fields[field_type.slot()].replace(tensor)
    }

    pub fn unregister(&mut self, field_type: FieldType) -> Option<FieldTensor> {
        self.fields[field_type.slot()].take()
    }

    pub fn clear(&mut self) {
        self.fields = Default::default();
    }

    pub fn get(&self, field_type: FieldType) -> Option<&FieldTensor> {
        self.fields[field_type.slot()].as_ref()
    }

    pub fn is_registered(&self, field_type: FieldType) -> bool {
        self.get(field_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active fields in declaration order of [`FieldType`].
    pub fn iter(&self) -> impl Iterator<Item = (FieldType, &FieldTensor)> {
        FieldType::ALL
            .into_iter()
            .filter_map(|ty| self.get(ty).map(|tensor| (ty, tensor)))
    }

    /// Weighted sum of every field applied to the state's field vector.
    ///
    /// Component 0 accelerates pitch, 1 drives phase, 2 is the energy
    /// consumption magnitude, 3 drives tension.
    pub fn compute_force(&self, state: &MusicalState) -> Vec4 {
        let v = state.field_vector();
        self.iter().fold(Vec4::zeros(), |acc, (ty, tensor)| {
            acc + tensor.apply(&v) * ty.weight()
        })
    }
}
