//! セル値のテキスト化
//!
//! 件名・説明・解決内容は文字列として扱う。空セルは "nan" になる。

use calamine::Data;

/// セル値をテキストに変換
pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => "nan".to_string(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_to_text(*f),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => {
            if dt.is_datetime() {
                if let Some(ndt) = dt.as_datetime() {
                    return ndt.format("%Y-%m-%d %H:%M:%S").to_string();
                }
            }
            float_to_text(dt.as_f64())
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// 数値のテキスト表現
///
/// 整数値は小数点なし、それ以外は最短表現（指数は e+NN / e-NN 形式）
pub fn float_to_text(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = f.abs();
    if f.fract() == 0.0 && abs < 1e16 {
        return format!("{}", f as i64);
    }
    if abs >= 1e16 || abs < 1e-4 {
        return exponent_text(f);
    }
    format!("{}", f)
}

fn exponent_text(f: f64) -> String {
    let raw = format!("{:e}", f);
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_empty_is_nan() {
        assert_eq!(cell_to_text(&Data::Empty), "nan");
    }

    #[test]
    fn test_string_passthrough() {
        assert_eq!(cell_to_text(&Data::String("Reinicio".into())), "Reinicio");
        assert_eq!(cell_to_text(&Data::String(String::new())), "");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(cell_to_text(&Data::Int(42)), "42");
        assert_eq!(cell_to_text(&Data::Float(5.0)), "5");
        assert_eq!(cell_to_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_text(&Data::Float(-0.25)), "-0.25");
    }

    #[test]
    fn test_float_exponent_form() {
        assert_eq!(float_to_text(1e16), "1e+16");
        assert_eq!(float_to_text(1.5e-7), "1.5e-07");
        assert_eq!(float_to_text(f64::NAN), "nan");
        assert_eq!(float_to_text(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_bool() {
        assert_eq!(cell_to_text(&Data::Bool(true)), "True");
        assert_eq!(cell_to_text(&Data::Bool(false)), "False");
    }

    #[test]
    fn test_error_cell() {
        assert_eq!(cell_to_text(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
    }
}
