use crate::{
    codec::{Document, Yaml, describe, scalar_text},
    data::{
        types::{Primitive, TypeDesc},
        value::Value,
    },
    error::{Error, Result},
};

macro_rules! impl_signed {
    ($($ty:ty => $prim:ident),* $(,)?) => {
        $(
            impl Yaml for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::Primitive(Primitive::$prim)
                }

                fn decode(node: &Document) -> Result<Self> {
                    let Document::Number(n) = node else {
                        return Err(Error::mismatch(stringify!($ty), describe(node)));
                    };
                    n.as_i64()
                        .and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| Error::mismatch(stringify!($ty), format!("`{n}`")))
                }

                fn encode(&self) -> Value {
                    Value::Int(*self as i64)
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty => $prim:ident),* $(,)?) => {
        $(
            impl Yaml for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::Primitive(Primitive::$prim)
                }

                fn decode(node: &Document) -> Result<Self> {
                    let Document::Number(n) = node else {
                        return Err(Error::mismatch(stringify!($ty), describe(node)));
                    };
                    n.as_u64()
                        .and_then(|u| <$ty>::try_from(u).ok())
                        .ok_or_else(|| Error::mismatch(stringify!($ty), format!("`{n}`")))
                }

                fn encode(&self) -> Value {
                    Value::UInt(*self as u64)
                }
            }
        )*
    };
}

impl_signed!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
impl_unsigned!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

impl Yaml for f64 {
    fn type_desc() -> TypeDesc {
        TypeDesc::Primitive(Primitive::F64)
    }

    fn decode(node: &Document) -> Result<Self> {
        node.as_f64()
            .ok_or_else(|| Error::mismatch("f64", describe(node)))
    }

    fn encode(&self) -> Value {
        Value::Float(*self)
    }
}

impl Yaml for f32 {
    fn type_desc() -> TypeDesc {
        TypeDesc::Primitive(Primitive::F32)
    }

    fn decode(node: &Document) -> Result<Self> {
        node.as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| Error::mismatch("f32", describe(node)))
    }

    fn encode(&self) -> Value {
        Value::Float(*self as f64)
    }
}

impl Yaml for bool {
    fn type_desc() -> TypeDesc {
        TypeDesc::Primitive(Primitive::Bool)
    }

    fn decode(node: &Document) -> Result<Self> {
        node.as_bool()
            .ok_or_else(|| Error::mismatch("bool", describe(node)))
    }

    fn encode(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Yaml for char {
    fn type_desc() -> TypeDesc {
        TypeDesc::Primitive(Primitive::Char)
    }

    fn decode(node: &Document) -> Result<Self> {
        let text = node
            .as_str()
            .ok_or_else(|| Error::mismatch("char", describe(node)))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::mismatch("char", describe(node))),
        }
    }

    fn encode(&self) -> Value {
        Value::Str(self.to_string())
    }
}

/// Numbers and booleans written where text is expected are taken as written.
impl Yaml for String {
    fn type_desc() -> TypeDesc {
        TypeDesc::Text
    }

    fn decode(node: &Document) -> Result<Self> {
        scalar_text(node).ok_or_else(|| Error::mismatch("string", describe(node)))
    }

    fn encode(&self) -> Value {
        Value::Str(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Document {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_integer_ranges() {
        assert_eq!(u16::decode(&parse("25565")).unwrap(), 25565);
        assert!(u8::decode(&parse("300")).is_err());
        assert!(u32::decode(&parse("-1")).is_err());
        assert_eq!(i8::decode(&parse("-128")).unwrap(), -128);
    }

    #[test]
    fn test_type_mismatch() {
        let err = i32::decode(&parse("\"text\"")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert!(bool::decode(&parse("1")).is_err());
    }

    #[test]
    fn test_floats_accept_integers() {
        assert_eq!(f64::decode(&parse("2")).unwrap(), 2.0);
        assert_eq!(f32::decode(&parse("0.5")).unwrap(), 0.5);
    }

    #[test]
    fn test_text_scalars() {
        assert_eq!(String::decode(&parse("hello")).unwrap(), "hello");
        assert_eq!(String::decode(&parse("8080")).unwrap(), "8080");
        assert!(String::decode(&parse("[a]")).is_err());
        assert_eq!(char::decode(&parse("x")).unwrap(), 'x');
        assert!(char::decode(&parse("xy")).is_err());
    }
}
