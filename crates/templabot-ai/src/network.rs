//! Feed-forward dense network exported layer by layer from Keras.

use serde::Deserialize;

use crate::error::PredictError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    fn apply(self, v: &mut [f32]) {
        match self {
            Self::Linear => {}
            Self::Relu => v.iter_mut().for_each(|x| *x = x.max(0.0)),
            Self::Sigmoid => v.iter_mut().for_each(|x| *x = 1.0 / (1.0 + (-*x).exp())),
            Self::Tanh => v.iter_mut().for_each(|x| *x = x.tanh()),
            Self::Softmax => {
                let max = v.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let mut sum = 0.0f32;
                for x in v.iter_mut() {
                    *x = (*x - max).exp();
                    sum += *x;
                }
                if sum > 0.0 {
                    v.iter_mut().for_each(|x| *x /= sum);
                }
            }
        }
    }
}

/// One dense layer as exported: `kernel` is `[inputs][units]`.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerExport {
    pub kernel: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkExport {
    pub layers: Vec<LayerExport>,
}

#[derive(Debug)]
struct DenseLayer {
    inputs: usize,
    units: usize,
    /// Row-major `[inputs][units]`.
    weights: Vec<f32>,
    bias: Vec<f32>,
    activation: Activation,
}

impl DenseLayer {
    fn forward(&self, x: &[f32]) -> Vec<f32> {
        let mut out = self.bias.clone();
        for (i, &xi) in x.iter().enumerate() {
            if xi == 0.0 {
                continue;
            }
            let row = &self.weights[i * self.units..(i + 1) * self.units];
            for (o, &w) in out.iter_mut().zip(row) {
                *o += xi * w;
            }
        }
        self.activation.apply(&mut out);
        out
    }
}

/// Immutable stack of dense layers.
#[derive(Debug)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Validate an export and build the network.
    pub fn from_export(export: NetworkExport) -> Result<Self, String> {
        if export.layers.is_empty() {
            return Err("network has no layers".into());
        }

        let mut layers = Vec::with_capacity(export.layers.len());
        let mut prev_units: Option<usize> = None;
        for (n, layer) in export.layers.into_iter().enumerate() {
            let inputs = layer.kernel.len();
            let units = layer.bias.len();
            if inputs == 0 || units == 0 {
                return Err(format!("layer {n} has an empty kernel or bias"));
            }
            if let Some(row) = layer.kernel.iter().position(|r| r.len() != units) {
                return Err(format!(
                    "layer {n}: kernel row {row} has {} columns, bias has {units}",
                    layer.kernel[row].len()
                ));
            }
            if let Some(prev) = prev_units
                && prev != inputs
            {
                return Err(format!(
                    "layer {n} expects {inputs} inputs but the previous layer has {prev} units"
                ));
            }
            prev_units = Some(units);
            layers.push(DenseLayer {
                inputs,
                units,
                weights: layer.kernel.into_iter().flatten().collect(),
                bias: layer.bias,
                activation: layer.activation,
            });
        }

        Ok(Self { layers })
    }

    pub fn input_dim(&self) -> usize {
        self.layers[0].inputs
    }

    pub fn num_classes(&self) -> usize {
        self.layers[self.layers.len() - 1].units
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn forward(&self, features: &[f32]) -> Result<Vec<f32>, PredictError> {
        if features.len() != self.input_dim() {
            return Err(PredictError::Classification(format!(
                "network expects {} features, got {}",
                self.input_dim(),
                features.len()
            )));
        }
        let mut x = features.to_vec();
        for layer in &self.layers {
            x = layer.forward(&x);
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: serde_json::Value) -> DenseNetwork {
        DenseNetwork::from_export(serde_json::from_value(value).unwrap()).unwrap()
    }

    #[test]
    fn single_linear_layer() {
        let net = build(json!({"layers": [
            {"kernel": [[1.0, 0.0], [0.0, 2.0], [1.0, 1.0]], "bias": [0.5, -0.5]}
        ]}));
        assert_eq!(net.input_dim(), 3);
        assert_eq!(net.num_classes(), 2);
        let out = net.forward(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(out, vec![2.5, 2.5]);
    }

    #[test]
    fn relu_then_softmax() {
        let net = build(json!({"layers": [
            {"kernel": [[1.0, -1.0]], "bias": [0.0, 0.0], "activation": "relu"},
            {"kernel": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], "bias": [0.0, 0.0, 0.0], "activation": "softmax"}
        ]}));
        // hidden = relu([2, -2]) = [2, 0]; logits = [2, 0, 0]
        let out = net.forward(&[2.0]).unwrap();
        let e2 = 2.0f32.exp();
        let sum = e2 + 2.0;
        assert!((out[0] - e2 / sum).abs() < 1e-6);
        assert!((out[1] - 1.0 / sum).abs() < 1e-6);
        assert!((out.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let mut v = vec![1000.0, 1000.0];
        Activation::Softmax.apply(&mut v);
        assert_eq!(v, vec![0.5, 0.5]);
    }

    #[test]
    fn sigmoid_and_tanh() {
        let mut v = vec![0.0];
        Activation::Sigmoid.apply(&mut v);
        assert_eq!(v, vec![0.5]);
        let mut v = vec![0.0];
        Activation::Tanh.apply(&mut v);
        assert_eq!(v, vec![0.0]);
    }

    #[test]
    fn wrong_width_is_classification_error() {
        let net = build(json!({"layers": [{"kernel": [[1.0]], "bias": [0.0]}]}));
        let err = net.forward(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, PredictError::Classification(_)));
    }

    #[test]
    fn rejects_inconsistent_layers() {
        let bad = [
            json!({"layers": []}),
            json!({"layers": [{"kernel": [], "bias": [0.0]}]}),
            json!({"layers": [{"kernel": [[1.0, 2.0], [1.0]], "bias": [0.0, 0.0]}]}),
            json!({"layers": [
                {"kernel": [[1.0, 2.0]], "bias": [0.0, 0.0]},
                {"kernel": [[1.0], [1.0], [1.0]], "bias": [0.0]}
            ]}),
        ];
        for value in bad {
            let export: NetworkExport = serde_json::from_value(value.clone()).unwrap();
            assert!(
                DenseNetwork::from_export(export).is_err(),
                "expected rejection of {value}"
            );
        }
    }

    #[test]
    fn unknown_activation_fails_to_parse() {
        let value = json!({"layers": [{"kernel": [[1.0]], "bias": [0.0], "activation": "gelu"}]});
        assert!(serde_json::from_value::<NetworkExport>(value).is_err());
    }
}
