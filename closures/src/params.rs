//! Closure Parameters

use crate::error::*;
use crate::tree::ClosureTree;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;
use std::fmt;

/// Type of a closure parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamType {
    Float,
    Int,
    Color,
    Vector,
    String,
    Closure,
}

impl fmt::Display for ParamType {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Color => "color",
            Self::Vector => "vector",
            Self::String => "string",
            Self::Closure => "closure color",
        };
        f.write_str(s)
    }
}

/// Declares one parameter of a closure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParamDesc {
    /// Parameter name.
    pub name: &'static str,

    /// Parameter type.
    pub ty: ParamType,
}

impl ParamDesc {
    /// Create a new `ParamDesc`.
    ///
    /// * `name` - Parameter name.
    /// * `ty`   - Parameter type.
    pub const fn new(name: &'static str, ty: ParamType) -> Self {
        Self { name, ty }
    }
}

/// A parameter value of a closure component.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Float(Float),
    Int(Int),
    Color(Spectrum),
    Vector(Vector3f),
    String(String),

    /// A nested closure tree; `None` is a null closure.
    Closure(Option<Box<ClosureTree>>),
}

impl ParamValue {
    /// Returns the type of the value.
    pub fn ty(&self) -> ParamType {
        match self {
            Self::Float(_) => ParamType::Float,
            Self::Int(_) => ParamType::Int,
            Self::Color(_) => ParamType::Color,
            Self::Vector(_) => ParamType::Vector,
            Self::String(_) => ParamType::String,
            Self::Closure(_) => ParamType::Closure,
        }
    }
}

/// Decodes a closure's parameter values positionally against its schema.
pub struct ParamReader<'a> {
    /// Closure name used in errors.
    closure: &'static str,

    /// Parameter schema.
    schema: &'static [ParamDesc],

    /// Values to decode.
    values: &'a [ParamValue],

    /// Position of the next value.
    next: usize,
}

impl<'a> ParamReader<'a> {
    /// Create a new `ParamReader`.
    ///
    /// * `closure` - Closure name.
    /// * `schema`  - Parameter schema.
    /// * `values`  - Values to decode.
    pub fn new(closure: &'static str, schema: &'static [ParamDesc], values: &'a [ParamValue]) -> Self {
        Self {
            closure,
            schema,
            values,
            next: 0,
        }
    }

    /// Returns the next value, if any, and advances.
    fn advance(&mut self) -> Option<&'a ParamValue> {
        let v = self.values.get(self.next);
        self.next += 1;
        v
    }

    /// Returns the error for the value just read.
    ///
    /// * `expected` - Expected type.
    fn mismatch(&self, expected: ParamType) -> ClosureError {
        let name = self.schema.get(self.next - 1).map_or("<extra>", |p| p.name);
        ClosureError::invalid_parameter(self.closure, name, expected)
    }

    /// Decodes a `float`.
    pub fn float(&mut self) -> ClosureResult<Float> {
        match self.advance() {
            Some(ParamValue::Float(v)) => Ok(*v),
            _ => Err(self.mismatch(ParamType::Float)),
        }
    }

    /// Decodes an `int`.
    pub fn int(&mut self) -> ClosureResult<Int> {
        match self.advance() {
            Some(ParamValue::Int(v)) => Ok(*v),
            _ => Err(self.mismatch(ParamType::Int)),
        }
    }

    /// Decodes a `color`.
    pub fn color(&mut self) -> ClosureResult<Spectrum> {
        match self.advance() {
            Some(ParamValue::Color(v)) => Ok(*v),
            _ => Err(self.mismatch(ParamType::Color)),
        }
    }

    /// Decodes a `vector`.
    pub fn vector(&mut self) -> ClosureResult<Vector3f> {
        match self.advance() {
            Some(ParamValue::Vector(v)) => Ok(*v),
            _ => Err(self.mismatch(ParamType::Vector)),
        }
    }

    /// Decodes a `string`.
    pub fn string(&mut self) -> ClosureResult<&'a str> {
        match self.advance() {
            Some(ParamValue::String(v)) => Ok(v.as_str()),
            _ => Err(self.mismatch(ParamType::String)),
        }
    }

    /// Decodes a nested closure. A null closure decodes to `None`.
    pub fn closure(&mut self) -> ClosureResult<Option<&'a ClosureTree>> {
        match self.advance() {
            Some(ParamValue::Closure(v)) => Ok(v.as_deref()),
            _ => Err(self.mismatch(ParamType::Closure)),
        }
    }
}

/// Checks arity and types of parameter values against a schema.
///
/// * `closure` - Closure name.
/// * `schema`  - Parameter schema.
/// * `values`  - Values to check.
pub fn check_params(closure: &'static str, schema: &[ParamDesc], values: &[ParamValue]) -> ClosureResult<()> {
    for (i, desc) in schema.iter().enumerate() {
        match values.get(i) {
            Some(v) if v.ty() == desc.ty => {}
            _ => return Err(ClosureError::invalid_parameter(closure, desc.name, desc.ty)),
        }
    }
    if values.len() > schema.len() {
        return Err(ClosureError::invalid_parameter(
            closure,
            format!("#{}", schema.len() + 1),
            format!("at most {} arguments", schema.len()),
        ));
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[ParamDesc] = &[
        ParamDesc::new("N", ParamType::Vector),
        ParamDesc::new("roughness", ParamType::Float),
    ];

    #[test]
    fn reads_values_in_order() {
        let values = [ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)), ParamValue::Float(0.5)];
        let mut reader = ParamReader::new("oren_nayar", SCHEMA, &values);
        assert_eq!(reader.vector(), Ok(Vector3f::new(0.0, 0.0, 1.0)));
        assert_eq!(reader.float(), Ok(0.5));
    }

    #[test]
    fn mistyped_value_names_the_parameter() {
        let values = [ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0)), ParamValue::Int(1)];
        let mut reader = ParamReader::new("oren_nayar", SCHEMA, &values);
        assert!(reader.vector().is_ok());
        assert_eq!(
            reader.float(),
            Err(ClosureError::invalid_parameter("oren_nayar", "roughness", ParamType::Float))
        );
    }

    #[test]
    fn check_params_arity() {
        let n = ParamValue::Vector(Vector3f::new(0.0, 0.0, 1.0));
        assert!(check_params("oren_nayar", SCHEMA, &[n.clone(), ParamValue::Float(0.1)]).is_ok());
        assert!(check_params("oren_nayar", SCHEMA, &[n.clone()]).is_err());
        assert!(check_params(
            "oren_nayar",
            SCHEMA,
            &[n, ParamValue::Float(0.1), ParamValue::Float(0.2)]
        )
        .is_err());
    }
}
