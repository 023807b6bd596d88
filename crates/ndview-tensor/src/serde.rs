use crate::{LayoutType, Tensor};

use serde::ser::SerializeStruct;
use serde::Deserialize;

impl<T> serde::Serialize for Tensor<T>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Tensor", 3)?;
        state.serialize_field("data", self.as_slice())?;
        state.serialize_field("shape", self.shape())?;
        state.serialize_field("layout", &self.layout())?;
        state.end()
    }
}

impl<'de, T> serde::Deserialize<'de> for Tensor<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct TensorData<T> {
            data: Vec<T>,
            shape: Vec<usize>,
            layout: LayoutType,
        }

        let TensorData {
            data,
            shape,
            layout,
        } = TensorData::deserialize(deserializer)?;

        Tensor::from_shape_vec_with_layout(&shape, data, layout).map_err(serde::de::Error::custom)
    }
}
