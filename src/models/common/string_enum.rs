/// 以字符串形式存储和传输的枚举
///
/// 生成 `as_str()`、`Display`、`FromStr`、`Serialize`、`Deserialize` 和 `TS`，
/// 数据库中保存的就是 `as_str()` 的值。
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $value:tt),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, ts_rs::TS)]
        $(#[$meta])*
        $vis enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)*
                    _ => Err(format!(
                        "Invalid {}: '{}'. Expected one of: {}",
                        stringify!($name),
                        s,
                        [$($value),*].join(", ")
                    )),
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use string_enum;

#[cfg(test)]
mod tests {
    string_enum! {
        enum Shade {
            Light => "light",
            DarkGrey => "dark_grey",
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("dark_grey".parse::<Shade>().unwrap(), Shade::DarkGrey);
        assert_eq!(Shade::Light.to_string(), "light");
        assert_eq!(Shade::ALL.len(), 2);
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Shade::DarkGrey).unwrap(), "\"dark_grey\"");
        let parsed: Shade = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(parsed, Shade::Light);
        let err = serde_json::from_str::<Shade>("\"blue\"").unwrap_err();
        assert!(err.to_string().contains("Expected one of: light, dark_grey"));
    }
}
