//! Encoder presets attached to an encode step.

/// An encoder configuration. Serializes to the engine's externally tagged
/// preset shape, e.g. `{"mozjpeg": {...}}` or the bare string `"gif"`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Mozjpeg { quality: u8, progressive: bool },
    Gif,
    /// Lossless PNG via lodepng.
    Lodepng { max_deflate: bool },
    /// Lossy PNG via pngquant.
    Pngquant {
        quality: u8,
        minimum_quality: u8,
        speed: u8,
        maximum_deflate: bool,
    },
    /// Lossy WebP.
    Webplossy { quality: u8 },
    Webplossless,
}

impl Preset {
    /// Applies fill-in defaults before serialization. A zero quality means
    /// "unset" and canonicalizes to maximum quality; it must never reach the
    /// engine as a literal 0.
    pub fn canonical(&self) -> Preset {
        match self.clone() {
            Preset::Mozjpeg {
                quality,
                progressive,
            } => Preset::Mozjpeg {
                quality: default_quality(quality),
                progressive,
            },
            Preset::Pngquant {
                quality,
                minimum_quality,
                speed,
                maximum_deflate,
            } => Preset::Pngquant {
                quality: default_quality(quality),
                minimum_quality,
                speed,
                maximum_deflate,
            },
            Preset::Webplossy { quality } => Preset::Webplossy {
                quality: default_quality(quality),
            },
            other => other,
        }
    }
}

fn default_quality(quality: u8) -> u8 {
    if quality == 0 { 100 } else { quality }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presets_serialize_to_wire_shapes() {
        assert_eq!(
            serde_json::to_value(Preset::Mozjpeg {
                quality: 90,
                progressive: true
            })
            .unwrap(),
            json!({"mozjpeg": {"quality": 90, "progressive": true}})
        );
        assert_eq!(serde_json::to_value(Preset::Gif).unwrap(), json!("gif"));
        assert_eq!(
            serde_json::to_value(Preset::Webplossless).unwrap(),
            json!("webplossless")
        );
        assert_eq!(
            serde_json::to_value(Preset::Lodepng { max_deflate: true }).unwrap(),
            json!({"lodepng": {"max_deflate": true}})
        );
    }

    #[test]
    fn zero_quality_canonicalizes_to_maximum() {
        let canonical = Preset::Mozjpeg {
            quality: 0,
            progressive: false,
        }
        .canonical();
        assert_eq!(
            canonical,
            Preset::Mozjpeg {
                quality: 100,
                progressive: false
            }
        );

        let canonical = Preset::Webplossy { quality: 0 }.canonical();
        assert_eq!(canonical, Preset::Webplossy { quality: 100 });
    }

    #[test]
    fn nonzero_quality_is_untouched() {
        let preset = Preset::Pngquant {
            quality: 80,
            minimum_quality: 50,
            speed: 3,
            maximum_deflate: false,
        };
        assert_eq!(preset.canonical(), preset);
    }
}
