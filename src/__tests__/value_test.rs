use crate::{apply_binary, apply_unary, construct, Constructed, TypeName, Value};

fn int(n: i64) -> Value {
    Value::Integer(n)
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let remainder = a % b;
        a = b;
        b = remainder;
    }
    a
}

#[test]
fn subtraction_is_addition_of_the_negation() {
    for a in -6..=6 {
        for b in -6..=6 {
            let direct = apply_binary("-", &int(a), &int(b)).unwrap();
            let negated = apply_unary("-", &int(b)).unwrap();
            let composed = apply_binary("+", &int(a), &negated).unwrap();
            assert_eq!(direct, composed);
        }
    }
}

#[test]
fn division_is_multiplication_by_the_inverse() {
    for a in -6..=6 {
        for b in 1..=6 {
            let direct = apply_binary("/", &int(a), &int(b)).unwrap();
            let inverted = apply_unary("/", &int(b)).unwrap();
            let composed = apply_binary("*", &int(a), &inverted).unwrap();
            assert_eq!(direct, composed);
        }
    }
}

#[test]
fn ordering_identities_hold() {
    for a in -4..=4 {
        for b in -4..=4 {
            let gt = apply_binary(">", &int(a), &int(b)).unwrap();
            let lt = apply_binary("<", &int(a), &int(b)).unwrap();
            let eq = apply_binary("=", &int(a), &int(b)).unwrap();
            let ge = apply_binary(">=", &int(a), &int(b)).unwrap();
            assert_eq!(gt, Value::Boolean(a > b));
            assert_eq!(lt, Value::Boolean(a < b));
            assert_eq!(eq, Value::Boolean(a == b));
            assert_eq!(ge, Value::Boolean(a >= b));
        }
    }
}

#[test]
fn fractions_stay_normalized() {
    for num in -20..=20i64 {
        for den in 1..=20i64 {
            let value = apply_binary("/", &int(num), &int(den)).unwrap();
            match value {
                Value::Integer(_) => assert_eq!(num % den, 0),
                Value::Fraction(n, d) => {
                    assert!(d > 1, "{}/{} kept denominator {}", num, den, d);
                    assert_eq!(gcd(n.abs(), d), 1, "{}/{} not reduced", num, den);
                }
                other => panic!("unexpected quotient {:?}", other),
            }
        }
    }
}

#[test]
fn division_collapses_to_integers() {
    assert_eq!(apply_binary("/", &int(5), &int(10)).unwrap(), Value::Fraction(1, 2));
    assert_eq!(apply_binary("/", &int(6), &int(3)).unwrap(), int(2));
    assert_eq!(apply_binary("/", &int(-6), &int(4)).unwrap(), Value::Fraction(-3, 2));
}

#[test]
fn division_by_zero_is_an_error() {
    let err = apply_binary("/", &int(1), &int(0)).unwrap_err();
    assert!(err.message.contains("Attempting to take 1 / 0"));
    let err = apply_unary("/", &int(0)).unwrap_err();
    assert!(err.message.contains("Attempting to apply unary / to 0"));
}

#[test]
fn mod_takes_the_sign_of_the_modulus() {
    for a in -12..=12 {
        for b in -5..=5 {
            if b == 0 {
                assert!(apply_binary("mod", &int(a), &int(b)).is_err());
                continue;
            }
            let value = apply_binary("mod", &int(a), &int(b)).unwrap();
            let r = match value {
                Value::Integer(r) => r,
                other => panic!("mod of integers must be an integer, got {:?}", other),
            };
            assert!(r == 0 || (r < 0) == (b < 0), "{} mod {} gave {}", a, b, r);
            assert!(r.abs() < b.abs(), "{} mod {} gave {}", a, b, r);
            // a = b * floor(a/b) + r
            assert_eq!((a - r) % b, 0);
        }
    }
}

#[test]
fn mod_works_on_fractions() {
    let seven_halves = Value::Fraction(7, 2);
    assert_eq!(
        apply_binary("mod", &seven_halves, &int(2)).unwrap(),
        Value::Fraction(3, 2)
    );
    assert_eq!(apply_binary("mod", &int(3), &int(-2)).unwrap(), int(-1));
}

#[test]
fn mixed_arithmetic_goes_through_the_reverse_hooks() {
    let half = Value::Fraction(1, 2);
    assert_eq!(apply_binary("+", &int(1), &half).unwrap(), Value::Fraction(3, 2));
    assert_eq!(apply_binary("*", &int(3), &half).unwrap(), Value::Fraction(3, 2));
    assert_eq!(apply_binary("-", &int(1), &half).unwrap(), Value::Fraction(1, 2));
    assert_eq!(apply_binary("/", &half, &int(2)).unwrap(), Value::Fraction(1, 4));
    assert_eq!(
        apply_binary("<", &int(1), &Value::Fraction(3, 2)).unwrap(),
        Value::Boolean(true)
    );
}

#[test]
fn equality_across_variants_is_false_not_an_error() {
    assert_eq!(
        apply_binary("=", &int(1), &Value::String("1".to_string())).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        apply_binary("\\=", &int(1), &Value::Boolean(true)).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        apply_binary("=", &int(1), &Value::Fraction(1, 2)).unwrap(),
        Value::Boolean(false)
    );
}

#[test]
fn ordering_across_variants_is_a_type_error() {
    let err = apply_binary("<", &int(1), &Value::Character('a')).unwrap_err();
    assert!(err.message.contains("Wrong operand types for <"));
    assert!(err.message.contains("Integer and Character"));
}

#[test]
fn strings_and_characters_compare_but_only_strictly() {
    let ab = Value::String("ab".to_string());
    let ac = Value::String("ac".to_string());
    assert_eq!(apply_binary("<", &ab, &ac).unwrap(), Value::Boolean(true));
    assert_eq!(
        apply_binary(">", &ab, &ac).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        apply_binary("<", &Value::Character('a'), &Value::Character('b')).unwrap(),
        Value::Boolean(true)
    );
    // the weak orderings are number hooks and do not exist on characters
    assert!(apply_binary("<=", &Value::Character('a'), &Value::Character('b')).is_err());
}

#[test]
fn concat_operators_join_with_a_space() {
    let ab = Value::String("ab".to_string());
    let c = Value::String("c".to_string());
    assert_eq!(
        apply_binary("|", &ab, &c).unwrap(),
        Value::String("ab c".to_string())
    );
    assert_eq!(
        apply_binary("||", &int(1), &Value::Boolean(true)).unwrap(),
        Value::String("1 true".to_string())
    );
}

#[test]
fn string_plus_concatenates_without_a_space() {
    let ab = Value::String("ab".to_string());
    assert_eq!(
        apply_binary("+", &ab, &int(1)).unwrap(),
        Value::String("ab1".to_string())
    );
    assert_eq!(
        apply_binary("+", &int(1), &ab).unwrap(),
        Value::String("1ab".to_string())
    );
}

#[test]
fn boolean_connectives_require_booleans() {
    assert_eq!(
        apply_binary("and", &Value::Boolean(true), &Value::Boolean(false)).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        apply_binary("or", &Value::Boolean(false), &Value::Boolean(true)).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(apply_unary("not", &Value::Boolean(true)).unwrap(), Value::Boolean(false));
    assert!(apply_binary("and", &Value::Boolean(true), &int(1)).is_err());
    assert!(apply_unary("not", &int(1)).is_err());
}

#[test]
fn unrecognized_operators_are_reported() {
    let err = apply_binary("**", &int(1), &int(2)).unwrap_err();
    assert!(err.message.contains("unrecognized binary operator"));
    let err = apply_unary("+", &int(1)).unwrap_err();
    assert!(err.message.contains("unrecognized unary operator"));
}

#[test]
fn integer_overflow_is_a_runtime_error() {
    let err = apply_binary("+", &int(i64::MAX), &int(1)).unwrap_err();
    assert!(err.message.contains("overflow"));
    let err = apply_binary("*", &int(i64::MAX), &int(2)).unwrap_err();
    assert!(err.message.contains("overflow"));
}

#[test]
fn constructors_convert_between_variants() {
    let built = construct(TypeName::Integer, &[Value::String("42".to_string())]).unwrap();
    assert!(matches!(built, Constructed::Value(Value::Integer(42))));

    // conversion from a fraction truncates toward zero
    let built = construct(TypeName::Integer, &[Value::Fraction(-7, 2)]).unwrap();
    assert!(matches!(built, Constructed::Value(Value::Integer(-3))));

    let built = construct(TypeName::Fraction, &[Value::String("5/10".to_string())]).unwrap();
    assert!(matches!(built, Constructed::Value(Value::Fraction(1, 2))));

    let built = construct(TypeName::Fraction, &[int(3), int(4)]).unwrap();
    assert!(matches!(built, Constructed::Value(Value::Fraction(3, 4))));

    let built = construct(TypeName::Boolean, &[Value::String("Yes".to_string())]).unwrap();
    assert!(matches!(built, Constructed::Value(Value::Boolean(true))));
    let built = construct(TypeName::Boolean, &[Value::String("no".to_string())]).unwrap();
    assert!(matches!(built, Constructed::Value(Value::Boolean(false))));

    let built = construct(TypeName::Character, &[int(65)]).unwrap();
    assert!(matches!(built, Constructed::Value(Value::Character('A'))));

    let built = construct(TypeName::String, &[Value::Fraction(1, 2)]).unwrap();
    assert!(matches!(built, Constructed::Value(Value::String(s)) if s == "1/2"));

    let built = construct(TypeName::Array, &[int(3)]).unwrap();
    assert!(matches!(built, Constructed::Alloc(3)));
}

#[test]
fn constructors_reject_bad_arguments() {
    assert!(construct(TypeName::Integer, &[]).is_err());
    assert!(construct(TypeName::Integer, &[Value::Boolean(true)]).is_err());
    assert!(construct(TypeName::Integer, &[Value::String("nope".to_string())]).is_err());
    assert!(construct(TypeName::Fraction, &[Value::String("1/0".to_string())]).is_err());
    assert!(construct(TypeName::Character, &[Value::String(String::new())]).is_err());
    assert!(construct(TypeName::Character, &[int(-1)]).is_err());
    assert!(construct(TypeName::String, &[Value::Type(TypeName::Integer)]).is_err());
    assert!(construct(TypeName::Array, &[int(-2)]).is_err());
    assert!(construct(TypeName::Array, &[Value::Fraction(1, 2)]).is_err());
    let err = construct(TypeName::Boolean, &[int(1), int(2)]).unwrap_err();
    assert!(err.message.contains("expected 1 argument; given 2"));
}

#[test]
fn display_and_debug_forms() {
    assert_eq!(Value::Fraction(1, 2).to_string(), "1/2");
    assert_eq!(Value::Boolean(true).to_string(), "true");
    assert_eq!(Value::Character('x').to_string(), "x");
    assert_eq!(format!("{:?}", Value::Character('x')), "'x'");
    assert_eq!(format!("{:?}", Value::String("hi".to_string())), "\"hi\"");
    assert_eq!(
        format!("{:?}", Value::Array { size: 3, base: 7 }),
        "Array(3,v7)"
    );
    assert_eq!(Value::Array { size: 3, base: 7 }.to_string(), "Array(3)");
    assert_eq!(Value::Type(TypeName::Integer).to_string(), "Integer");
}
