extern crate proc_macro;
extern crate quote;
extern crate syn;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

// #[derive(Writable)] implements io::Writable for a struct T whose body
// writes (in declaration order) all the members of T and returns Ok.
// Every record the collision format carries is a plain sequence of
// big-endian fields with no padding, so field order is the wire order.
#[proc_macro_derive(Writable)]
pub fn field_sequence_write_fn(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = parse_macro_input!(item as DeriveInput);

    let name = &ast.ident;
    let fields = write_generate_fields(&ast.data);

    let expanded = quote! {
        impl Writable for #name {
            fn write(&self, to: &mut dyn BufMut) -> ColResult<()> {
                #fields
                Ok(())
            }
        }
    };

    proc_macro::TokenStream::from(expanded)
}

// Take all the fields in a struct and generate `self.field.write(to)?`
// for each field. Tuple structs write `self.0`, `self.1`, ...
fn write_generate_fields(data: &Data) -> TokenStream {
    match data {
        Data::Struct(ref data) => match data.fields {
            Fields::Named(ref fields) => {
                let field_writes = fields.named.iter().map(|f| {
                    let name = &f.ident;
                    quote! {
                        self.#name.write(to)?
                    }
                });
                quote! {
                    #(#field_writes;)*
                }
            }
            Fields::Unnamed(ref fields) => {
                let field_writes = fields.unnamed.iter().enumerate().map(|(i, _)| {
                    let index = syn::Index::from(i);
                    quote! {
                        self.#index.write(to)?
                    }
                });
                quote! {
                    #(#field_writes;)*
                }
            }
            Fields::Unit => quote! {},
        },
        Data::Enum(_) | Data::Union(_) => unimplemented!(),
    }
}
