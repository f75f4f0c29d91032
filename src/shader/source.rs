//! Program source generation.

use crate::effects::effect::{Effect, EffectMask};
use crate::gpu::backend::ProgramSource;

/// Vertex stage shared by every sprite program.
pub const SPRITE_VERTEX: &str = r#"
uniform mat4 u_projectionMatrix;
uniform mat4 u_modelMatrix;

attribute vec2 a_position;
attribute vec2 a_texCoord;

varying vec2 v_texCoord;

void main() {
    gl_Position = u_projectionMatrix * u_modelMatrix * vec4(a_position, 0, 1);
    v_texCoord = a_texCoord;
}
"#;

/// Fragment stage; effect blocks are compiled in through `ENABLE_<effect>` defines.
pub const SPRITE_FRAGMENT: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif

uniform sampler2D u_skin;
uniform vec2 u_skinSize;
uniform float u_color;
uniform float u_brightness;
uniform float u_ghost;
uniform float u_fisheye;
uniform float u_whirl;
uniform float u_pixelate;
uniform float u_mosaic;

varying vec2 v_texCoord;

const vec2 kCenter = vec2(0.5, 0.5);
const float kRadius = 0.5;
const float minLightness = 0.11 / 2.0;
const float minSaturation = 0.09;

vec3 convertRGB2HSV(vec3 rgb)
{
    vec4 P = (rgb.g < rgb.b) ? vec4(rgb.bg, -1.0, 2.0/3.0) : vec4(rgb.gb, 0.0, -1.0/3.0);
    vec4 Q = (rgb.r < P.x) ? vec4(P.xyw, rgb.r) : vec4(rgb.r, P.yzx);
    float C = Q.x - min(Q.w, Q.y);
    float H = abs((Q.w - Q.y) / (6.0 * C + 1e-10) + Q.z);
    return vec3(H, C / (Q.x + 1e-10), Q.x);
}

vec3 convertHue2RGB(float hue)
{
    float r = abs(hue * 6.0 - 3.0) - 1.0;
    float g = 2.0 - abs(hue * 6.0 - 2.0);
    float b = 2.0 - abs(hue * 6.0 - 4.0);
    return clamp(vec3(r, g, b), 0.0, 1.0);
}

vec3 convertHSV2RGB(vec3 hsv)
{
    vec3 rgb = convertHue2RGB(hsv.x);
    return ((rgb - 1.0) * hsv.y + 1.0) * hsv.z;
}

void main()
{
    vec2 texcoord0 = v_texCoord;

#ifdef ENABLE_mosaic
    texcoord0 = fract(u_mosaic * texcoord0);
#endif

#ifdef ENABLE_pixelate
    {
        vec2 pixelTexelSize = u_skinSize / u_pixelate;
        texcoord0 = (floor(texcoord0 * pixelTexelSize) + kCenter) / pixelTexelSize;
    }
#endif

#ifdef ENABLE_whirl
    {
        vec2 offset = texcoord0 - kCenter;
        float offsetMagnitude = length(offset);
        float whirlFactor = max(1.0 - (offsetMagnitude / kRadius), 0.0);
        float whirlActual = u_whirl * whirlFactor * whirlFactor;
        float sinWhirl = sin(whirlActual);
        float cosWhirl = cos(whirlActual);
        mat2 rotationMatrix = mat2(cosWhirl, -sinWhirl, sinWhirl, cosWhirl);
        texcoord0 = rotationMatrix * offset + kCenter;
    }
#endif

#ifdef ENABLE_fisheye
    {
        vec2 vec = (texcoord0 - kCenter) / kCenter;
        float vecLength = length(vec);
        float r = pow(min(vecLength, 1.0), u_fisheye) * max(1.0, vecLength);
        vec2 unit = vec / vecLength;
        texcoord0 = kCenter + r * unit * kCenter;
    }
#endif

    gl_FragColor = texture2D(u_skin, texcoord0);

#if defined(ENABLE_color) || defined(ENABLE_brightness)
    gl_FragColor.rgb = clamp(gl_FragColor.rgb / (gl_FragColor.a + 1e-10), 0.0, 1.0);

#ifdef ENABLE_color
    {
        vec3 hsv = convertRGB2HSV(gl_FragColor.rgb);
        if (hsv.z < minLightness) hsv = vec3(0.0, 1.0, minLightness);
        else if (hsv.y < minSaturation) hsv = vec3(0.0, minSaturation, hsv.z);
        hsv.x = mod(hsv.x + u_color, 1.0);
        if (hsv.x < 0.0) hsv.x += 1.0;
        gl_FragColor.rgb = convertHSV2RGB(hsv);
    }
#endif

#ifdef ENABLE_brightness
    gl_FragColor.rgb = clamp(gl_FragColor.rgb + vec3(u_brightness), vec3(0), vec3(1));
#endif

    gl_FragColor.rgb *= gl_FragColor.a + 1e-10;
#endif

    gl_FragColor *= u_ghost;
}
"#;

/// Define line enabling one effect block.
pub fn effect_define(effect: Effect) -> String {
    format!("#define ENABLE_{}", effect.name())
}

/// Sprite program source with the defines of `mask` injected ahead of the fragment body.
pub fn sprite_program(mask: EffectMask) -> ProgramSource {
    let mut fragment = String::new();
    for effect in mask.iter() {
        fragment.push_str(&effect_define(effect));
        fragment.push('\n');
    }
    fragment.push_str(SPRITE_FRAGMENT);
    ProgramSource {
        vertex: SPRITE_VERTEX.to_owned(),
        fragment,
    }
}
