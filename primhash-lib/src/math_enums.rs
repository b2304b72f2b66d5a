use std::ops::{Index, IndexMut};

use enum_map::Enum;
use enumset::{EnumSet, EnumSetType};
use glam::{BVec3, Vec3};

macro_rules! impl_from_for_vec {
    { $enum_type:ident for $value_type:ident {
        $( $variant:ident => ( $( $value:expr ),* ), )*
    } } => {
        impl From<$enum_type> for $value_type {
            fn from(value: $enum_type) -> Self {
                match value {
                    $( <$enum_type>::$variant => Self::new( $( $value as _ ),* ), )*
                }
            }
        }
    };
    { $enum_type:ident for [ $( $value_type:ident ),* ] $values:tt } => { $(
        impl_from_for_vec! {
            $enum_type for $value_type
            $values
        }
    )* };
}

macro_rules! impl_index_for_vec {
    { $axis_type:ident for $base_type:ident: $vector_type:ident {
        $( $axis_name:ident => $axis_field:ident, )*
    } } => {
        impl Index<$axis_type> for $vector_type {
            type Output = $base_type;

            fn index(&self, index: $axis_type) -> &Self::Output {
                match index {
                    $( $axis_type::$axis_name => &self.$axis_field, )*
                }
            }
        }

        impl IndexMut<$axis_type> for $vector_type {
            fn index_mut(&mut self, index: $axis_type) -> &mut Self::Output {
                match index {
                    $( $axis_type::$axis_name => &mut self.$axis_field, )*
                }
            }
        }
    };
    { $axis_type:ident for [
        $( $base_type:ident: $( $vector_type:ident ),* ; )*
    ] $axes:tt } => { $( $(
        impl_index_for_vec! {
            $axis_type for $base_type: $vector_type
            $axes
        }
    )* )* };
}

/// A three-dimensional axis; `X`, `Y`, or `Z`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Enum, EnumSetType)]
#[enumset(no_super_impls)]
pub enum Axis3 {
    X,
    Y,
    Z,
}

impl Axis3 {
    /// The bit that selects the upper half along this axis within an [`Octant`] index.
    ///
    /// `X` is the most significant of the three bits, `Z` the least significant.
    pub const fn octant_bit(self) -> u8 {
        match self {
            Self::X => 0b100,
            Self::Y => 0b010,
            Self::Z => 0b001,
        }
    }

    /// Returns the other two axes in a rotationally symmetrical order (think cross-product).
    pub fn cross_axes(self) -> (Self, Self) {
        match self {
            Self::X => (Self::Y, Self::Z),
            Self::Y => (Self::Z, Self::X),
            Self::Z => (Self::X, Self::Y),
        }
    }
}

impl_from_for_vec! {
    Axis3 for [Vec3] {
        X => (1, 0, 0),
        Y => (0, 1, 0),
        Z => (0, 0, 1),
    }
}

impl_index_for_vec! {
    Axis3 for [
        f32: Vec3;
        bool: BVec3;
    ] {
        X => x,
        Y => y,
        Z => z,
    }
}

/// A set of three-dimensional axes.
pub type Axes3 = EnumSet<Axis3>;

/// Combines the [`Axis3::octant_bit`] of every axis in the set.
pub fn octant_mask(axes: Axes3) -> u8 {
    axes.iter().fold(0, |mask, axis| mask | axis.octant_bit())
}

/// One of the eight equally sized sub-cubes of a cube.
///
/// The variants are declared in index order, so that [`Enum::into_usize`] and `as u8` both yield
/// the 3-bit octant index: bit 2 selects the upper `X` half, bit 1 the upper `Y` half and bit 0 the
/// upper `Z` half.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Enum, EnumSetType)]
#[enumset(no_super_impls)]
pub enum Octant {
    X0Y0Z0,
    X0Y0Z1,
    X0Y1Z0,
    X0Y1Z1,
    X1Y0Z0,
    X1Y0Z1,
    X1Y1Z0,
    X1Y1Z1,
}

impl Octant {
    /// Constructs an [`Octant`] from its 3-bit index.
    ///
    /// Only the lowest three bits of `index` are considered.
    pub const fn from_index(index: u8) -> Self {
        match index & 0b111 {
            0 => Self::X0Y0Z0,
            1 => Self::X0Y0Z1,
            2 => Self::X0Y1Z0,
            3 => Self::X0Y1Z1,
            4 => Self::X1Y0Z0,
            5 => Self::X1Y0Z1,
            6 => Self::X1Y1Z0,
            7 => Self::X1Y1Z1,
            _ => unreachable!(), // should get optimized away
        }
    }

    /// Constructs an [`Octant`] from the half it occupies along each axis.
    pub const fn from_halves(x_max: bool, y_max: bool, z_max: bool) -> Self {
        Self::from_index(((x_max as u8) << 2) | ((y_max as u8) << 1) | z_max as u8)
    }

    /// The 3-bit index of this octant.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Whether the octant occupies the upper half along the given `axis`.
    pub const fn is_max(self, axis: Axis3) -> bool {
        self as u8 & axis.octant_bit() != 0
    }

    /// Returns the octant with its half along `axis` replaced.
    pub const fn with_half(self, axis: Axis3, max: bool) -> Self {
        if max {
            Self::from_index(self as u8 | axis.octant_bit())
        } else {
            Self::from_index(self as u8 & !axis.octant_bit())
        }
    }

    /// Returns the octant mirrored along every axis in `axes`.
    ///
    /// Mirroring is its own inverse.
    pub fn mirrored(self, axes: Axes3) -> Self {
        Self::from_index(self as u8 ^ octant_mask(axes))
    }
}

impl_from_for_vec! {
    Octant for [Vec3] {
        X0Y0Z0 => (-1, -1, -1),
        X0Y0Z1 => (-1, -1, 1),
        X0Y1Z0 => (-1, 1, -1),
        X0Y1Z1 => (-1, 1, 1),
        X1Y0Z0 => (1, -1, -1),
        X1Y0Z1 => (1, -1, 1),
        X1Y1Z0 => (1, 1, -1),
        X1Y1Z1 => (1, 1, 1),
    }
}

/// A set of octants.
pub type Octants = EnumSet<Octant>;
