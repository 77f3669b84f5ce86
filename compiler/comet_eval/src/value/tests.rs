use super::*;
use crate::PointerWidth;
use comet_ir::Ty;
use pretty_assertions::assert_eq;

const T64: TargetInfo = TargetInfo::new(PointerWidth::W64);
const T32: TargetInfo = TargetInfo::new(PointerWidth::W32);

#[test]
fn test_integer_kinds_form_one_range() {
    let integers = [
        ValueKind::I8,
        ValueKind::I16,
        ValueKind::I32,
        ValueKind::I64,
        ValueKind::Isize,
        ValueKind::U8,
        ValueKind::U16,
        ValueKind::U32,
        ValueKind::U64,
        ValueKind::Usize,
    ];
    for kind in integers {
        assert!(kind.is_integer(), "{kind} should be an integer kind");
        assert!(kind.is_numeric());
    }
    for kind in [
        ValueKind::Bool,
        ValueKind::Float,
        ValueKind::Double,
        ValueKind::String,
        ValueKind::Pointer,
        ValueKind::Null,
        ValueKind::Poison,
        ValueKind::Destruct,
    ] {
        assert!(!kind.is_integer(), "{kind} should not be an integer kind");
    }
    assert!(ValueKind::Isize.is_signed());
    assert!(!ValueKind::U8.is_signed());
    assert!(ValueKind::Double.is_numeric());
}

#[test]
fn test_int_constructor_truncates_to_width() {
    let v = Value::int(IntTy::U8, 0x1_23, &T64, Span::DUMMY);
    assert_eq!(v.kind(), ValueKind::U8);
    assert_eq!(v.int_value(), Some(0x23));

    let neg = Value::int(IntTy::I8, 0xFF, &T64, Span::DUMMY);
    assert_eq!(neg.int_value(), Some(-1));
    assert_eq!(neg.to_string(), "-1");
}

#[test]
fn test_usize_width_follows_target() {
    let wide = Value::int(IntTy::Usize, u64::MAX, &T64, Span::DUMMY);
    let narrow = Value::int(IntTy::Usize, u64::MAX, &T32, Span::DUMMY);
    assert_eq!(wide.int_value(), Some(i128::from(u64::MAX)));
    assert_eq!(narrow.int_value(), Some(i128::from(u32::MAX)));
    assert_eq!(ValueKind::Usize.bit_width(&T32), Some(32));
}

#[test]
fn test_accessors_match_kind() {
    let b = Value::bool(true, Span::new(1, 5));
    assert_eq!(b.as_bool(), Some(true));
    assert_eq!(b.as_int(), None);
    assert_eq!(b.span(), Span::new(1, 5));

    let d = Value::float(1.5, Span::DUMMY);
    assert_eq!(d.as_f64(), Some(1.5));
    assert_eq!(d.kind(), ValueKind::Float);

    assert!(Value::null(Span::DUMMY).is_null());
    assert!(Value::poison(Span::DUMMY).is_poison());
}

#[test]
fn test_with_span_keeps_payload() {
    let v = Value::int(IntTy::I32, 7, &T64, Span::new(0, 1)).with_span(Span::new(4, 9));
    assert_eq!(v.span(), Span::new(4, 9));
    assert_eq!(v.int_value(), Some(7));
}

#[test]
fn test_pointer_round_trip() {
    let start = PointerValue::new(Address::new(0x1000), Ty::Int(IntTy::U32), &T64);
    assert_eq!(start.stride(), 4);

    let moved = start.increment(3).unwrap();
    assert_eq!(moved.address(), Address::new(0x100C));
    let back = moved.decrement(3).unwrap();
    assert_eq!(back.address(), start.address());
    assert_eq!(back, start);
}

#[test]
fn test_pointer_overflow_is_none() {
    let ptr = PointerValue::new(Address::new(8), Ty::Int(IntTy::U64), &T64);
    assert!(ptr.decrement(2).is_none());
    assert!(ptr.increment(u64::MAX).is_none());
}

#[test]
fn test_void_pointer_steps_by_byte() {
    let ptr = PointerValue::new(Address::new(0x10), Ty::Void, &T64);
    assert_eq!(ptr.increment(1).map(|p| p.address()), Some(Address::new(0x11)));
}

#[test]
fn test_str_view_slicing() {
    let view = StrView::new(Address::new(0x100), 5);
    let tail = view.slice_from(2).unwrap();
    assert_eq!(tail.address(), Address::new(0x102));
    assert_eq!(tail.len(), 3);
    assert_eq!(view.slice_from(0), Some(view));
    assert!(view.slice_from(5).is_some_and(|v| v.is_empty()));
    assert_eq!(view.slice_from(6), None);
}

#[test]
fn test_kind_of_ty() {
    assert_eq!(ValueKind::of_ty(&Ty::ptr_to(Ty::Bool)), ValueKind::Pointer);
    assert_eq!(ValueKind::of_ty(&Ty::Int(IntTy::Isize)), ValueKind::Isize);
    assert_eq!(ValueKind::of_ty(&Ty::Str), ValueKind::String);
}
